// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Initializing,
    Idle,
    Planning,
    Running,
    Paused,
}

art_core::simple_display! {
    Status {
        Initializing => "initializing",
        Idle => "idle",
        Planning => "planning",
        Running => "running",
        Paused => "paused",
    }
}

impl Status {
    pub fn can_transition_to(self, next: Status) -> bool {
        use Status::*;
        matches!(
            (self, next),
            (Initializing, Idle)
                | (Idle, Planning)
                | (Idle, Running)
                | (Planning, Running)
                | (Planning, Idle)
                | (Running, Paused)
                | (Running, Idle)
                | (Paused, Running)
                | (Paused, Idle)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Auto,
    Step,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Auto
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
