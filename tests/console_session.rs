use std::sync::{Arc, Mutex};
use std::time::Duration;

use entity_chat::api::{
    ChatBackend, ChatReply, ChatRequest, ExecuteReply, ExecuteRequest, ProcessInfo,
};
use entity_chat::console::{Console, Exit};
use entity_chat::controller::ChatController;
use entity_chat::error::Result;
use entity_chat::transcript::Transcript;

#[derive(Debug, Default)]
struct EchoBackend {
    messages: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ChatBackend for EchoBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.messages.lock().unwrap().push(request.message.clone());
        Ok(ChatReply {
            response: Some(format!("echo: {}", request.message)),
        })
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteReply> {
        Ok(ExecuteReply {
            stdout: Some(format!("ran {}", request.command)),
            ..Default::default()
        })
    }

    async fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
        Ok(Vec::new())
    }
}

async fn run_session(script: &str) -> (Exit, String, Arc<EchoBackend>, ChatController) {
    let backend = Arc::new(EchoBackend::default());
    let controller = ChatController::new(backend.clone(), Transcript::with_welcome("Welcome!"));
    let mut output = Vec::new();

    let exit = Console::new(controller.clone())
        .run(script.as_bytes(), &mut output)
        .await
        .unwrap();

    (exit, String::from_utf8(output).unwrap(), backend, controller)
}

#[tokio::test]
async fn test_session_until_quit() {
    let (exit, output, backend, controller) =
        run_session("hello\nrun: ls\n\nQUIT\nignored\n").await;

    assert_eq!(exit, Exit::Quit);
    assert!(output.starts_with("Welcome!\n\n"));
    assert!(output.contains("you> hello\n"));
    assert!(output.contains("entity> Typing...\n"));
    assert!(output.contains("entity> echo: hello\n"));
    assert!(output.contains("you> run: ls\n"));
    assert!(output.contains("entity> ```bash\nran ls\n```\n"));
    assert!(!output.contains("ignored"));

    assert_eq!(*backend.messages.lock().unwrap(), vec!["hello".to_string()]);
    assert_eq!(controller.history().len(), 2);
    assert_eq!(controller.transcript().pending_count(), 0);
}

#[tokio::test]
async fn test_continuation_lines_form_one_message() {
    let (exit, output, backend, _controller) = run_session("first line\\\nsecond line\n").await;

    assert_eq!(exit, Exit::EndOfInput);
    assert_eq!(
        *backend.messages.lock().unwrap(),
        vec!["first line\nsecond line".to_string()]
    );
    assert!(output.contains("entity> echo: first line\nsecond line\n"));
}

#[tokio::test]
async fn test_blank_lines_send_nothing() {
    let (exit, output, backend, controller) = run_session("\n   \n").await;

    assert_eq!(exit, Exit::EndOfInput);
    assert_eq!(output, "Welcome!\n\n");
    assert!(backend.messages.lock().unwrap().is_empty());
    assert_eq!(controller.transcript().nodes().len(), 1);
}

// Answers every message after a delay, so a burst of input piles up in flight.
#[derive(Debug)]
struct SlowEchoBackend {
    delay: Duration,
}

#[async_trait::async_trait]
impl ChatBackend for SlowEchoBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        tokio::time::sleep(self.delay).await;
        Ok(ChatReply {
            response: Some(format!("echo: {}", request.message)),
        })
    }

    async fn execute(&self, _request: &ExecuteRequest) -> Result<ExecuteReply> {
        tokio::time::sleep(self.delay).await;
        Ok(ExecuteReply::default())
    }

    async fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_piped_input_prints_every_reply() {
    const LINES: usize = 300;

    let backend = Arc::new(SlowEchoBackend {
        delay: Duration::from_millis(50),
    });
    let controller = ChatController::new(backend, Transcript::new());
    let script: String = (0..LINES).map(|i| format!("m{i}\n")).collect();
    let mut output = Vec::new();

    let exit = Console::new(controller.clone())
        .run(script.as_bytes(), &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(exit, Exit::EndOfInput);
    assert_eq!(controller.transcript().messages().len(), 2 * LINES);
    assert_eq!(controller.history().len(), 2 * LINES);
    assert_eq!(output.matches("entity> echo: m").count(), LINES);
    for i in 0..LINES {
        assert_eq!(output.matches(&format!("you> m{i}\n")).count(), 1, "m{i}");
        assert_eq!(
            output.matches(&format!("entity> echo: m{i}\n")).count(),
            1,
            "reply to m{i}"
        );
    }
}
