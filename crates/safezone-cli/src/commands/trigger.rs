use clap::Args;
use safezone_core::{Config, EmergencyController, Event, Ticker, TriggerError};

use super::{build_controller, print_event, runtime, CliResult, HostArgs};

#[derive(Args)]
pub struct TriggerArgs {
    #[command(flatten)]
    pub host: HostArgs,
}

pub fn run(args: TriggerArgs) -> CliResult {
    let config = Config::load()?;
    let controller = build_controller(config, Some(&args.host))?;
    runtime()?.block_on(run_cycle(controller))
}

/// Send the alert, then drive the countdown until it escalates or the user
/// presses Ctrl-C. A call that could not be opened fails the command.
async fn run_cycle(mut controller: EmergencyController) -> CliResult {
    print_event(&controller.acquire_location().await?)?;
    for event in controller.trigger().await? {
        print_event(&event)?;
    }

    let mut ticker = Ticker::default();
    ticker.arm(controller.config().countdown.unit());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while controller.countdown().is_active() {
        tokio::select! {
            biased;
            signal = &mut ctrl_c => {
                signal?;
                if let Some(event) = controller.cancel() {
                    print_event(&event)?;
                }
                break;
            }
            _ = ticker.tick() => {
                if let Some(event) = controller.tick().await {
                    print_event(&event)?;
                    if let Event::EscalationFailed { reason, .. } = event {
                        return Err(TriggerError::EscalationFailure(reason).into());
                    }
                }
            }
        }
    }
    Ok(())
}
