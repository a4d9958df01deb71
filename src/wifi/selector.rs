//! Interactive network picker.
//!
//! Browses one scan's results with the Y pot, asks for a password on the
//! on-screen keyboard when the network needs one, and keeps retrying
//! until a connection comes up. Waits (prompt, connection, notices) are
//! states with deadlines so the caller keeps ticking.

use crate::config::{Config, SSID_MAX_LEN};
use crate::context::Context;
use crate::storage::CredentialStore;
use crate::ui::input::{ControlInputs, InputFrame};
use crate::ui::input_logic::wrap_step;
use crate::ui::keyboard::{Keyboard, KeyboardStep};
use crate::ui::marquee::Marquee;
use crate::ui::{screens, Surface};
use crate::wifi::attempt::{AttemptStatus, ConnectionAttempt};
use crate::wifi::{AuthMode, Connection, CredentialPair, NetworkRecord, Radio};

/// Externally visible state of the selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectorPhase {
    NothingToSelect,
    Browsing,
    PasswordPrompt,
    EnteringPassword,
    Connecting,
    Connected,
    Failed,
}

/// Result of one selector poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorStep {
    /// Still working; poll again.
    Pending,
    /// Link is up and the pair has been handed to the vault.
    Connected {
        connection: Connection,
        credentials: CredentialPair,
    },
    /// The list was empty; the notice has been shown.
    Empty,
}

enum State {
    NothingToSelect {
        since_ms: u64,
    },
    Browsing,
    PasswordPrompt {
        since_ms: u64,
    },
    EnteringPassword(Keyboard),
    Connecting {
        attempt: ConnectionAttempt,
        credentials: CredentialPair,
    },
    Connected {
        since_ms: u64,
        connection: Connection,
        credentials: CredentialPair,
    },
    Failed {
        since_ms: u64,
    },
}

pub struct NetworkSelector {
    selected: usize,
    ssid: Marquee<SSID_MAX_LEN>,
    prompt: Marquee<SSID_MAX_LEN>,
    state: State,
    dirty: bool,
}

impl NetworkSelector {
    pub fn new(networks: &[NetworkRecord], config: &Config, now_ms: u64) -> Self {
        let mut ssid = Marquee::new(config.ssid_marquee);
        let state = match networks.first() {
            Some(first) => {
                ssid.set_text(first.ssid.as_str(), now_ms);
                State::Browsing
            }
            None => {
                info!("No networks to select from");
                State::NothingToSelect { since_ms: now_ms }
            }
        };

        Self {
            selected: 0,
            ssid,
            prompt: Marquee::new(config.prompt_marquee),
            state,
            dirty: true,
        }
    }

    /// Advance one tick and repaint what changed.
    pub fn poll<R, S, I, D>(
        &mut self,
        ctx: &mut Context<R, S, I, D>,
        networks: &[NetworkRecord],
        frame: InputFrame,
        now_ms: u64,
    ) -> SelectorStep
    where
        R: Radio,
        S: CredentialStore,
        I: ControlInputs,
        D: Surface,
    {
        let step = self.advance(ctx, networks, frame, now_ms);
        self.paint(ctx, networks);
        step
    }

    fn advance<R, S, I, D>(
        &mut self,
        ctx: &mut Context<R, S, I, D>,
        networks: &[NetworkRecord],
        frame: InputFrame,
        now_ms: u64,
    ) -> SelectorStep
    where
        R: Radio,
        S: CredentialStore,
        I: ControlInputs,
        D: Surface,
    {
        let notice_ms = ctx.config.wifi.notice_ms;

        let next = match &mut self.state {
            State::NothingToSelect { since_ms } => {
                if now_ms.saturating_sub(*since_ms) >= notice_ms {
                    return SelectorStep::Empty;
                }
                None
            }

            State::Browsing => {
                if !frame.dy.is_still() {
                    let next = wrap_step(self.selected, frame.dy.delta(), networks.len());
                    if next != self.selected {
                        self.selected = next;
                        if let Some(net) = networks.get(next) {
                            debug!("Selected {}: {}", next + 1, net.ssid.as_str());
                            self.ssid.set_text(net.ssid.as_str(), now_ms);
                        }
                        self.dirty = true;
                    }
                }
                if self.ssid.update(now_ms) {
                    self.dirty = true;
                }

                match networks.get(self.selected) {
                    None => Some(State::NothingToSelect { since_ms: now_ms }),
                    Some(net) if frame.pressed => {
                        if net.needs_password() {
                            self.prompt.set_text(net.ssid.as_str(), now_ms);
                            Some(State::PasswordPrompt { since_ms: now_ms })
                        } else {
                            let credentials = CredentialPair::new(net.ssid.as_str(), "");
                            Some(begin(ctx, credentials, net.auth, now_ms))
                        }
                    }
                    Some(_) => None,
                }
            }

            State::PasswordPrompt { since_ms } => {
                if now_ms.saturating_sub(*since_ms) >= ctx.config.wifi.prompt_ms {
                    Some(State::EnteringPassword(Keyboard::new(
                        ctx.config.edit_marquee,
                        now_ms,
                    )))
                } else {
                    None
                }
            }

            State::EnteringPassword(keyboard) => match keyboard.poll(frame, now_ms) {
                KeyboardStep::Editing => None,
                KeyboardStep::Finished(password) => match networks.get(self.selected) {
                    Some(net) => {
                        let credentials = CredentialPair::new(net.ssid.as_str(), password.as_str());
                        Some(begin(ctx, credentials, net.auth, now_ms))
                    }
                    None => Some(State::Failed { since_ms: now_ms }),
                },
            },

            State::Connecting {
                attempt,
                credentials,
            } => match attempt.poll(&mut ctx.radio, now_ms) {
                AttemptStatus::Pending => None,
                AttemptStatus::Connected(connection) => {
                    ctx.vault.ensure_saved(credentials);
                    Some(State::Connected {
                        since_ms: now_ms,
                        connection,
                        credentials: credentials.clone(),
                    })
                }
                AttemptStatus::Failed => Some(State::Failed { since_ms: now_ms }),
            },

            State::Connected {
                since_ms,
                connection,
                credentials,
            } => {
                if now_ms.saturating_sub(*since_ms) >= notice_ms {
                    return SelectorStep::Connected {
                        connection: connection.clone(),
                        credentials: credentials.clone(),
                    };
                }
                None
            }

            State::Failed { since_ms } => {
                // Presses during the notice are swallowed.
                if frame.pressed && now_ms.saturating_sub(*since_ms) >= notice_ms {
                    if let Err(e) = ctx.radio.disconnect() {
                        warn!("Disconnect failed: {:?}", e);
                    }
                    Some(State::Browsing)
                } else {
                    None
                }
            }
        };

        if let Some(state) = next {
            self.state = state;
            self.dirty = true;
            debug!("Selector -> {:?}", self.phase());
        }
        SelectorStep::Pending
    }

    fn paint<R, S, I, D>(
        &mut self,
        ctx: &mut Context<R, S, I, D>,
        networks: &[NetworkRecord],
    ) where
        R: Radio,
        S: CredentialStore,
        I: ControlInputs,
        D: Surface,
    {
        let surface = &mut ctx.surface;
        let painted = match &mut self.state {
            State::Browsing => match networks.get(self.selected) {
                Some(net) if self.dirty => {
                    screens::network_summary(surface, net, &self.ssid, self.selected, networks.len());
                    true
                }
                _ => false,
            },
            State::EnteringPassword(keyboard) => {
                if self.dirty || keyboard.needs_redraw() {
                    keyboard.render(surface);
                    true
                } else {
                    false
                }
            }
            _ if !self.dirty => false,
            State::NothingToSelect { .. } => {
                screens::nothing_to_select(surface);
                true
            }
            State::PasswordPrompt { .. } => {
                screens::password_prompt(surface, &self.prompt);
                true
            }
            // Painted by `begin` before the radio is asked.
            State::Connecting { .. } => false,
            State::Connected { connection, .. } => {
                screens::connected(surface, connection.address);
                true
            }
            State::Failed { .. } => {
                screens::connection_failed(surface);
                true
            }
        };

        if painted {
            ctx.present();
        }
        self.dirty = false;
    }

    pub fn phase(&self) -> SelectorPhase {
        match self.state {
            State::NothingToSelect { .. } => SelectorPhase::NothingToSelect,
            State::Browsing => SelectorPhase::Browsing,
            State::PasswordPrompt { .. } => SelectorPhase::PasswordPrompt,
            State::EnteringPassword(_) => SelectorPhase::EnteringPassword,
            State::Connecting { .. } => SelectorPhase::Connecting,
            State::Connected { .. } => SelectorPhase::Connected,
            State::Failed { .. } => SelectorPhase::Failed,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Scroller bound to the selected SSID.
    pub fn ssid_marquee(&self) -> &Marquee<SSID_MAX_LEN> {
        &self.ssid
    }
}

/// Show the connecting screen, then start connecting with `credentials`;
/// a radio that refuses goes straight to the failure notice.
fn begin<R, S, I, D>(
    ctx: &mut Context<R, S, I, D>,
    credentials: CredentialPair,
    auth: AuthMode,
    now_ms: u64,
) -> State
where
    R: Radio,
    S: CredentialStore,
    I: ControlInputs,
    D: Surface,
{
    screens::connecting(&mut ctx.surface, credentials.ssid.as_str());
    ctx.present();

    let started = ConnectionAttempt::start(
        &mut ctx.radio,
        credentials.ssid.as_str(),
        credentials.password_for(auth),
        now_ms,
        ctx.config.wifi.connect_timeout_ms,
    );
    match started {
        Ok(attempt) => State::Connecting {
            attempt,
            credentials,
        },
        Err(e) => {
            warn!("Could not start connection: {:?}", e);
            State::Failed { since_ms: now_ms }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KEY_PASSWORD, KEY_SSID};
    use crate::mock::{ConnectOutcome, FrameBuffer, MemoryStore, MockRadio, ScriptedInputs};
    use crate::ui::input::Movement;

    type TestContext = Context<MockRadio, MemoryStore, ScriptedInputs, FrameBuffer>;

    fn nets() -> [NetworkRecord; 3] {
        [
            NetworkRecord::new("Cafe", -45, AuthMode::Open),
            NetworkRecord::new("Home-5G", -62, AuthMode::Wpa2Psk),
            NetworkRecord::new("Neighbour with a very long name", -85, AuthMode::Wpa3Psk),
        ]
    }

    fn ctx() -> TestContext {
        Context::new(
            MockRadio::new(&nets()),
            MemoryStore::new(),
            ScriptedInputs::neutral(),
            FrameBuffer::new(),
            Config::new(),
        )
    }

    fn idle() -> InputFrame {
        InputFrame::IDLE
    }

    fn press() -> InputFrame {
        InputFrame {
            pressed: true,
            ..InputFrame::IDLE
        }
    }

    fn step(dx: Movement, dy: Movement) -> InputFrame {
        InputFrame {
            dx,
            dy,
            pressed: false,
        }
    }

    fn saved(ctx: &TestContext) -> (Option<&str>, Option<&str>) {
        let store = ctx.vault.store();
        (
            store.value("wifi-creds", KEY_SSID),
            store.value("wifi-creds", KEY_PASSWORD),
        )
    }

    #[test]
    fn empty_list_reports_after_notice() {
        let mut ctx = ctx();
        let mut sel = NetworkSelector::new(&[], &ctx.config, 0);
        assert_eq!(sel.phase(), SelectorPhase::NothingToSelect);
        assert_eq!(sel.poll(&mut ctx, &[], press(), 1_999), SelectorStep::Pending);
        assert_eq!(sel.poll(&mut ctx, &[], idle(), 2_000), SelectorStep::Empty);
        assert_eq!(ctx.surface.frames, 1);
    }

    #[test]
    fn vertical_moves_wrap_and_rebind_marquee() {
        let mut ctx = ctx();
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);
        assert_eq!(sel.ssid_marquee().text(), "Cafe");

        sel.poll(&mut ctx, &nets, step(Movement::Still, Movement::Back), 10);
        assert_eq!(sel.selected(), 2);
        assert_eq!(sel.ssid_marquee().text(), "Neighbour with a very long name");

        sel.poll(&mut ctx, &nets, step(Movement::Still, Movement::Forward), 20);
        assert_eq!(sel.selected(), 0);

        // Horizontal movement does not browse.
        sel.poll(&mut ctx, &nets, step(Movement::Forward, Movement::Still), 30);
        assert_eq!(sel.selected(), 0);
    }

    #[test]
    fn open_network_connects_without_password() {
        let mut ctx = ctx();
        ctx.radio.accept("Cafe", "", 2);
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);

        sel.poll(&mut ctx, &nets, press(), 100);
        assert_eq!(sel.phase(), SelectorPhase::Connecting);
        assert_eq!(ctx.radio.attempts[0].1, None);

        sel.poll(&mut ctx, &nets, idle(), 120);
        sel.poll(&mut ctx, &nets, idle(), 140);
        assert_eq!(sel.phase(), SelectorPhase::Connected);
        assert_eq!(saved(&ctx), (Some("Cafe"), Some("")));

        assert_eq!(sel.poll(&mut ctx, &nets, idle(), 2_139), SelectorStep::Pending);
        match sel.poll(&mut ctx, &nets, idle(), 2_140) {
            SelectorStep::Connected {
                connection,
                credentials,
            } => {
                assert_eq!(connection.ssid.as_str(), "Cafe");
                assert_eq!(credentials, CredentialPair::new("Cafe", ""));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn protected_network_prompts_then_uses_keyboard() {
        let mut ctx = ctx();
        ctx.radio.accept("Home-5G", "A", 1);
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);

        sel.poll(&mut ctx, &nets, step(Movement::Still, Movement::Forward), 0);
        sel.poll(&mut ctx, &nets, press(), 10);
        assert_eq!(sel.phase(), SelectorPhase::PasswordPrompt);

        sel.poll(&mut ctx, &nets, idle(), 1_009);
        assert_eq!(sel.phase(), SelectorPhase::PasswordPrompt);
        sel.poll(&mut ctx, &nets, idle(), 1_010);
        assert_eq!(sel.phase(), SelectorPhase::EnteringPassword);

        // Cursor starts on DEL; 'A' is three cells right, OK is back at column 1.
        let right = step(Movement::Forward, Movement::Still);
        let left = step(Movement::Back, Movement::Still);
        let mut t = 1_100;
        for frame in [right, right, right, press(), left, left, press()] {
            sel.poll(&mut ctx, &nets, frame, t);
            t += 200;
        }
        assert_eq!(sel.phase(), SelectorPhase::Connecting);
        assert_eq!(ctx.radio.attempts[0].0.as_str(), "Home-5G");
        assert_eq!(ctx.radio.attempts[0].1.as_deref(), Some("A"));

        sel.poll(&mut ctx, &nets, idle(), t);
        assert_eq!(sel.phase(), SelectorPhase::Connected);
        assert_eq!(saved(&ctx), (Some("Home-5G"), Some("A")));
    }

    #[test]
    fn failure_waits_for_press_after_notice() {
        let mut ctx = ctx();
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);
        sel.poll(&mut ctx, &nets, press(), 0);
        assert_eq!(sel.phase(), SelectorPhase::Connecting);

        // No accepted credentials: the attempt hangs until the timeout.
        sel.poll(&mut ctx, &nets, idle(), 9_999);
        assert_eq!(sel.phase(), SelectorPhase::Connecting);
        sel.poll(&mut ctx, &nets, idle(), 10_000);
        assert_eq!(sel.phase(), SelectorPhase::Failed);

        sel.poll(&mut ctx, &nets, press(), 11_000);
        assert_eq!(sel.phase(), SelectorPhase::Failed);
        assert_eq!(ctx.radio.disconnects, 0);

        sel.poll(&mut ctx, &nets, idle(), 12_500);
        assert_eq!(sel.phase(), SelectorPhase::Failed);

        sel.poll(&mut ctx, &nets, press(), 12_600);
        assert_eq!(sel.phase(), SelectorPhase::Browsing);
        assert_eq!(ctx.radio.disconnects, 1);
        assert_eq!(saved(&ctx), (None, None));
    }

    #[test]
    fn retry_resumes_at_same_index_with_marquee_kept() {
        let mut ctx = ctx();
        ctx.radio.outcome = ConnectOutcome::Reject;
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);

        sel.poll(&mut ctx, &nets, step(Movement::Still, Movement::Back), 0);
        assert_eq!(sel.selected(), 2);
        let position_before = sel.ssid_marquee().position();

        sel.poll(&mut ctx, &nets, press(), 10);
        sel.poll(&mut ctx, &nets, idle(), 1_010);
        assert_eq!(sel.phase(), SelectorPhase::EnteringPassword);
        // Confirm straight away with an empty password.
        sel.poll(&mut ctx, &nets, step(Movement::Forward, Movement::Still), 1_100);
        sel.poll(&mut ctx, &nets, press(), 1_300);
        assert_eq!(sel.phase(), SelectorPhase::Connecting);
        sel.poll(&mut ctx, &nets, idle(), 1_320);
        assert_eq!(sel.phase(), SelectorPhase::Failed);

        sel.poll(&mut ctx, &nets, press(), 3_320);
        assert_eq!(sel.phase(), SelectorPhase::Browsing);
        assert_eq!(sel.selected(), 2);
        assert_eq!(sel.ssid_marquee().text(), "Neighbour with a very long name");
        assert!(sel.ssid_marquee().position() >= position_before);
    }

    #[test]
    fn connecting_screen_is_presented_once() {
        let mut ctx = ctx();
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);
        sel.poll(&mut ctx, &nets, idle(), 0);
        let frames = ctx.surface.frames;

        sel.poll(&mut ctx, &nets, press(), 20);
        assert_eq!(sel.phase(), SelectorPhase::Connecting);
        assert_eq!(ctx.surface.frames, frames + 1);
        assert!(ctx.surface.lit_pixels() > 0);
    }

    #[test]
    fn long_ssid_head_frame_is_painted_on_wrap() {
        let mut ctx = ctx();
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);
        sel.poll(&mut ctx, &nets, step(Movement::Still, Movement::Back), 0);
        assert_eq!(sel.selected(), 2);

        let mut last_position = sel.ssid_marquee().position();
        let mut wrapped_at = None;
        for t in (20..20_000).step_by(20) {
            let before = ctx.surface.frames;
            sel.poll(&mut ctx, &nets, idle(), t);
            let position = sel.ssid_marquee().position();
            if last_position > 0 && position == 0 {
                assert_eq!(ctx.surface.frames, before + 1);
                wrapped_at = Some(t);
                break;
            }
            last_position = position;
        }
        let wrapped_at = wrapped_at.expect("marquee wraps");

        // Nothing moves during the head pause, so nothing is repainted.
        let frames = ctx.surface.frames;
        for t in (wrapped_at + 20..wrapped_at + 1_400).step_by(20) {
            sel.poll(&mut ctx, &nets, idle(), t);
        }
        assert_eq!(ctx.surface.frames, frames);
    }

    #[test]
    fn radio_refusing_to_start_shows_failure() {
        let mut ctx = ctx();
        ctx.radio.outcome = ConnectOutcome::Error;
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);
        sel.poll(&mut ctx, &nets, press(), 0);
        assert_eq!(sel.phase(), SelectorPhase::Failed);
    }

    #[test]
    fn static_screens_are_presented_once() {
        let mut ctx = ctx();
        let nets = nets();
        let mut sel = NetworkSelector::new(&nets, &ctx.config, 0);
        sel.poll(&mut ctx, &nets, press(), 0);
        let frames = ctx.surface.frames;
        for t in 1..50 {
            sel.poll(&mut ctx, &nets, idle(), t * 20);
        }
        assert_eq!(ctx.surface.frames, frames);
    }
}
