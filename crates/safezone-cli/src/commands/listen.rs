use std::io::BufRead;

use clap::Args;
use safezone_core::detector::bridge;
use safezone_core::{Config, CoreError, DetectorError, DetectorSink, Session, SessionCommand};
use tokio::sync::mpsc;

use super::{build_controller, print_event, runtime, CliResult, HostArgs};

#[derive(Args)]
pub struct ListenArgs {
    #[command(flatten)]
    pub host: HostArgs,
}

/// A line typed on stdin, routed either to the session or the detector.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Command(SessionInput),
    Payload(&'a str),
    Blank,
}

#[derive(Debug, PartialEq, Eq)]
enum SessionInput {
    Trigger,
    Cancel,
    Status,
    Listen,
    Quit,
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        ":trigger" => Input::Command(SessionInput::Trigger),
        ":cancel" => Input::Command(SessionInput::Cancel),
        ":status" => Input::Command(SessionInput::Status),
        ":listen" => Input::Command(SessionInput::Listen),
        ":quit" | ":q" => Input::Command(SessionInput::Quit),
        payload => Input::Payload(payload),
    }
}

pub fn run(args: ListenArgs) -> CliResult {
    let config = Config::load()?;
    let capacity = config.detector.channel_capacity;
    let mut controller = build_controller(config, Some(&args.host))?;
    let rt = runtime()?;

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (commands, commands_rx) = mpsc::channel(16);

    rt.block_on(async {
        print_event(&controller.acquire_location().await?)?;
        let (sink, host) = bridge(capacity);
        commands
            .send(SessionCommand::Listen(host))
            .await
            .map_err(|_| DetectorError::Closed)?;

        let session = tokio::spawn(Session::new(controller, events_tx).run(commands_rx));
        let reader = std::thread::spawn(move || read_stdin(sink, capacity, commands));
        eprintln!("listening; type a transcript, or :trigger :cancel :status :listen :quit");

        while let Some(event) = events.recv().await {
            print_event(&event)?;
        }
        let controller = session.await.map_err(std::io::Error::other)?;
        tracing::info!(phase = ?controller.phase(), "listen session finished");
        // The reader may still be blocked on stdin; it exits on its next line.
        drop(reader);
        Ok::<(), CoreError>(())
    })
}

fn read_stdin(mut sink: DetectorSink, capacity: usize, commands: mpsc::Sender<SessionCommand>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let command = match classify(&line) {
            Input::Blank => continue,
            Input::Payload(payload) => {
                if let Err(err) = sink.post_blocking(payload) {
                    eprintln!("detector not listening ({err}); type :listen to re-arm");
                }
                continue;
            }
            Input::Command(SessionInput::Trigger) => SessionCommand::Trigger,
            Input::Command(SessionInput::Cancel) => SessionCommand::Cancel,
            Input::Command(SessionInput::Status) => SessionCommand::Snapshot,
            Input::Command(SessionInput::Listen) => {
                let (fresh, host) = bridge(capacity);
                sink = fresh;
                SessionCommand::Listen(host)
            }
            Input::Command(SessionInput::Quit) => break,
        };
        if commands.blocking_send(command).is_err() {
            return;
        }
    }
    let _ = commands.blocking_send(SessionCommand::Shutdown);
}
