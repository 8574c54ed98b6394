use std::sync::Arc;

use subtle::ConstantTimeEq;
use tokio::sync::Mutex;

use super::config::UnlockConfig;
use super::errors::UnlockError;
use super::haptics::Haptics;
use super::types::{GateMode, GateStatus, PinError};
use crate::biometric::BiometricManager;
use crate::session::SessionOrchestrator;
use crate::storage::{KeyValueStore, PIN_ATTEMPTS_KEY, PIN_SECRET_KEY};

#[derive(Debug)]
struct GateState {
    mode: GateMode,
    entered: String,
    error: Option<PinError>,
    remaining_attempts: u32,
    unlocked: bool,
    logged_out: bool,
    biometric_prompted: bool,
    /// A new PIN is stored and biometric enrollment is being offered
    enrolling: bool,
}

impl GateState {
    fn settled(&self) -> bool {
        self.unlocked || self.logged_out || self.enrolling
    }
}

/// PIN pad with a biometric fast path, sitting in front of a locked session.
///
/// In create mode the first complete entry becomes the PIN. In verify mode entries are
/// compared with the stored PIN; running out of attempts tears the session down. The
/// remaining attempts live in the store, so reopening the gate does not refill them.
pub struct UnlockGate {
    session: Arc<SessionOrchestrator>,
    biometrics: Arc<BiometricManager>,
    store: Arc<dyn KeyValueStore>,
    haptics: Arc<dyn Haptics>,
    config: UnlockConfig,
    state: Mutex<GateState>,
}

impl UnlockGate {
    /// Opens the gate in create or verify mode depending on whether a PIN is stored.
    pub async fn open(
        session: Arc<SessionOrchestrator>,
        biometrics: Arc<BiometricManager>,
        store: Arc<dyn KeyValueStore>,
        haptics: Arc<dyn Haptics>,
        config: UnlockConfig,
    ) -> Result<Self, UnlockError> {
        let mode = match store.get(PIN_SECRET_KEY).await? {
            Some(secret) if !secret.is_empty() => GateMode::Verify,
            _ => GateMode::Create,
        };
        let remaining_attempts = match mode {
            GateMode::Verify => remaining_attempts(store.as_ref(), config.max_attempts).await?,
            GateMode::Create => config.max_attempts,
        };
        tracing::debug!(
            "Unlock gate opened in {:?} mode, {} attempts left",
            mode,
            remaining_attempts
        );

        let state = GateState {
            mode,
            entered: String::with_capacity(config.pin_length),
            error: None,
            remaining_attempts,
            unlocked: false,
            logged_out: false,
            biometric_prompted: false,
            enrolling: false,
        };

        Ok(Self {
            session,
            biometrics,
            store,
            haptics,
            config,
            state: Mutex::new(state),
        })
    }

    /// Runs the biometric fast path, once per gate and only in verify mode.
    ///
    /// A declined or failed prompt leaves the PIN pad as it was, without an error.
    pub async fn start(&self) -> GateStatus {
        {
            let mut state = self.state.lock().await;
            if state.mode != GateMode::Verify || state.biometric_prompted || state.settled() {
                return self.snapshot(&state);
            }
            state.biometric_prompted = true;
        }

        // The prompt runs without holding the gate so status stays readable
        let verified = self.biometrics.is_available().await
            && self.biometrics.is_enrolled().await
            && self.biometrics.authenticate().await;

        let mut state = self.state.lock().await;
        if verified && !state.settled() {
            tracing::info!("Unlocked with biometrics");
            self.haptics.success();
            self.finish_unlock(&mut state);
        } else if !verified {
            tracing::debug!("Biometric fast path not used, falling back to PIN");
        }
        self.snapshot(&state)
    }

    pub async fn press_digit(&self, digit: char) -> Result<GateStatus, UnlockError> {
        if !digit.is_ascii_digit() {
            return Err(UnlockError::InvalidDigit(digit));
        }

        let mut state = self.state.lock().await;
        if state.settled() || state.entered.len() >= self.config.pin_length {
            return Ok(self.snapshot(&state));
        }

        // The previous mismatch stays visible until a new entry begins
        if state.entered.is_empty() {
            state.error = None;
        }
        state.entered.push(digit);
        self.haptics.digit();

        if state.entered.len() < self.config.pin_length {
            return Ok(self.snapshot(&state));
        }

        let pin = std::mem::take(&mut state.entered);
        if state.mode == GateMode::Verify {
            self.verify_pin(&mut state, &pin).await?;
            return Ok(self.snapshot(&state));
        }

        self.store_pin(&mut state, &pin).await?;
        state.enrolling = true;
        drop(state);

        // Enrollment can wait on the user for a long time; the gate stays readable meanwhile
        self.offer_enrollment().await;

        let mut state = self.state.lock().await;
        state.enrolling = false;
        self.haptics.success();
        self.finish_unlock(&mut state);
        Ok(self.snapshot(&state))
    }

    pub async fn delete_digit(&self) -> GateStatus {
        let mut state = self.state.lock().await;
        if !state.settled() {
            state.entered.pop();
        }
        self.snapshot(&state)
    }

    pub async fn status(&self) -> GateStatus {
        let state = self.state.lock().await;
        self.snapshot(&state)
    }

    async fn store_pin(&self, state: &mut GateState, pin: &str) -> Result<(), UnlockError> {
        self.store.set(PIN_SECRET_KEY, pin).await?;
        self.reset_attempts(state).await?;
        tracing::info!("PIN created");
        Ok(())
    }

    async fn offer_enrollment(&self) {
        if self.config.offer_biometric_enrollment
            && self.biometrics.is_available().await
            && !self.biometrics.is_enrolled().await
        {
            let enrolled = self.biometrics.enroll().await;
            tracing::info!("Biometric enrollment offered, enrolled: {}", enrolled);
        }
    }

    async fn reset_attempts(&self, state: &mut GateState) -> Result<(), UnlockError> {
        self.store.remove(PIN_ATTEMPTS_KEY).await?;
        state.remaining_attempts = self.config.max_attempts;
        Ok(())
    }

    async fn verify_pin(&self, state: &mut GateState, pin: &str) -> Result<(), UnlockError> {
        let secret = self.store.get(PIN_SECRET_KEY).await?.unwrap_or_default();
        let matches =
            !secret.is_empty() && bool::from(pin.as_bytes().ct_eq(secret.as_bytes()));

        if matches {
            self.reset_attempts(state).await?;
            self.haptics.success();
            self.finish_unlock(state);
            return Ok(());
        }

        state.remaining_attempts = state.remaining_attempts.saturating_sub(1);
        self.store
            .set(PIN_ATTEMPTS_KEY, &state.remaining_attempts.to_string())
            .await?;
        self.haptics.failure();

        if state.remaining_attempts > 0 {
            tracing::info!(
                "PIN mismatch, {} attempts left",
                state.remaining_attempts
            );
            state.error = Some(PinError::Mismatch {
                remaining_attempts: state.remaining_attempts,
            });
            return Ok(());
        }

        tracing::warn!("PIN attempt budget exhausted, logging out");
        state.logged_out = true;
        for key in [PIN_SECRET_KEY, PIN_ATTEMPTS_KEY] {
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!("Failed to remove {}: {}", key, e);
            }
        }
        self.session.logout().await?;
        Ok(())
    }

    fn finish_unlock(&self, state: &mut GateState) {
        state.error = None;
        state.unlocked = true;
        self.session.unlock();
    }

    fn snapshot(&self, state: &GateState) -> GateStatus {
        GateStatus {
            mode: state.mode,
            entered: state.entered.len(),
            pin_length: self.config.pin_length,
            error: state.error.clone(),
            remaining_attempts: state.remaining_attempts,
            unlocked: state.unlocked,
            logged_out: state.logged_out,
        }
    }
}

/// Reads the stored attempt count. A missing or unreadable value means a full budget.
async fn remaining_attempts(
    store: &dyn KeyValueStore,
    max_attempts: u32,
) -> Result<u32, UnlockError> {
    let remaining = store
        .get(PIN_ATTEMPTS_KEY)
        .await?
        .and_then(|raw| raw.parse::<u32>().ok())
        .map_or(max_attempts, |left| left.min(max_attempts));
    Ok(remaining)
}
