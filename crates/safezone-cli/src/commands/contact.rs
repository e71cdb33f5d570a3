use clap::Subcommand;
use safezone_core::{Config, PreconditionKind, TriggerError};

use super::{build_controller, print_event, runtime, CliResult};

#[derive(Subcommand)]
pub enum ContactAction {
    /// Save the emergency contact number
    Set {
        /// Phone number to text and call
        number: String,
    },
    /// Show the contact the next alert would use
    Show,
}

pub fn run(action: ContactAction) -> CliResult {
    let controller = build_controller(Config::load_or_default(), None)?;
    let rt = runtime()?;
    match action {
        ContactAction::Set { number } => {
            let event = rt.block_on(controller.save_contact(&number))?;
            print_event(&event)?;
        }
        ContactAction::Show => match rt.block_on(controller.contact())? {
            Some(contact) => println!("{contact}"),
            None => {
                return Err(TriggerError::Precondition(PreconditionKind::MissingContact).into())
            }
        },
    }
    Ok(())
}
