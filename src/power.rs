//! OS power control

use crate::core::driver::PowerControl;
use crate::error::{Error, Result};
use std::process::Command;

/// Runs an external command (by default `sudo shutdown -h now`)
pub struct CommandPower {
    command: Vec<String>,
}

impl CommandPower {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl PowerControl for CommandPower {
    fn shutdown(&mut self) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::Shutdown("empty shutdown command".to_string()))?;

        log::info!("Running shutdown command: {}", self.command.join(" "));
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| Error::Shutdown(format!("{}: {}", program, e)))?;

        if !status.success() {
            return Err(Error::Shutdown(format!("{} exited with {}", program, status)));
        }
        Ok(())
    }
}
