//! Main-loop integration tests, driven by a scripted utterance source

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

use vigil_assistant::Result;
use vigil_assistant::asr::UtteranceSource;
use vigil_assistant::daemon::command_loop;
use vigil_assistant::hud;

mod common;
use common::Harness;

/// Replays a fixed script, then blocks forever like a silent room
struct ScriptedSource {
    script: VecDeque<String>,
}

impl ScriptedSource {
    fn new(lines: &[&str]) -> Self {
        Self {
            script: lines.iter().map(ToString::to_string).collect(),
        }
    }
}

#[async_trait(?Send)]
impl UtteranceSource for ScriptedSource {
    async fn next_utterance(&mut self) -> Result<String> {
        match self.script.pop_front() {
            Some(line) => Ok(line),
            None => std::future::pending().await,
        }
    }
}

#[tokio::test]
async fn stop_command_ends_the_loop_with_a_farewell() {
    let h = Harness::new();
    let (quit_tx, mut shutdown_rx) = mpsc::channel(1);
    let hud = hud::spawn(quit_tx);

    // Empty utterances are skipped without dispatch; "stop" terminates
    let mut source = ScriptedSource::new(&["", "quelle heure", "", "stop"]);
    command_loop(&mut source, &h.interpreter, &hud, &mut shutdown_rx).await;

    let spoken = h.finish();
    assert_eq!(spoken.len(), 2);
    assert!(spoken[0].starts_with("Il est"));
    assert_eq!(spoken[1], "Au revoir !");
}

#[tokio::test]
async fn quit_affordance_ends_the_loop_like_a_stop_command() {
    let h = Harness::new();
    let (quit_tx, mut shutdown_rx) = mpsc::channel(1);
    let hud = hud::spawn(quit_tx);

    hud.request_quit().await;

    // Nothing but silence on the microphone; only the quit signal can
    // end this loop
    let mut source = ScriptedSource::new(&[]);
    command_loop(&mut source, &h.interpreter, &hud, &mut shutdown_rx).await;

    assert!(h.finish().is_empty());
}
