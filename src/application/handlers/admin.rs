//! Operator controls received on the `admin` channel.

use crate::domain::foundation::DomainError;
use crate::domain::relay::AdminCommand;

use super::wheel_scheduler::WheelHandle;

#[derive(Debug, Clone)]
pub struct AdminControlHandler {
    wheel: WheelHandle,
}

impl AdminControlHandler {
    pub fn new(wheel: WheelHandle) -> Self {
        Self { wheel }
    }

    pub async fn handle(&self, command: AdminCommand) -> Result<(), DomainError> {
        tracing::info!(command = command.as_str(), "Admin command received");
        match command {
            AdminCommand::ReloadWheel => self.wheel.reload().await?,
            AdminCommand::StopWheel => self.wheel.stop().await?,
        }
        Ok(())
    }
}
