//! Collaborators shared by every step of the connection flow.

use crate::config::Config;
use crate::storage::{CredentialStore, CredentialVault};
use crate::ui::input::{ControlInputs, Controls, InputFrame};
use crate::ui::Surface;
use crate::wifi::Radio;

/// Radio, credential vault, controls and display, plus the runtime config.
///
/// Built once by the caller and lent to each `poll`.
pub struct Context<R, S, I, D> {
    pub radio: R,
    pub vault: CredentialVault<S>,
    pub controls: Controls<I>,
    pub surface: D,
    pub config: Config,
}

impl<R, S, I, D> Context<R, S, I, D>
where
    R: Radio,
    S: CredentialStore,
    I: ControlInputs,
    D: Surface,
{
    pub fn new(radio: R, store: S, inputs: I, surface: D, config: Config) -> Self {
        Self {
            radio,
            vault: CredentialVault::new(store, config.wifi.namespace),
            controls: Controls::new(inputs, &config.input),
            surface,
            config,
        }
    }

    /// Debounced controls for this tick.
    pub fn read_input(&mut self, now_ms: u64) -> InputFrame {
        self.controls.poll(now_ms)
    }

    /// Flush the frame; a failed flush is logged and otherwise ignored.
    pub fn present(&mut self) {
        if let Err(e) = self.surface.present() {
            warn!("Display flush failed: {:?}", e);
        }
    }
}
