use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::CryptoError;
use crate::models::{
    valid_cycle_length, valid_period_length, AppData, CycleProfile, CycleSummary,
    CycleTrackerEntry, PredictionSettings, MAX_CYCLE_LENGTH_DAYS, MAX_PERIOD_LENGTH_DAYS,
};
use crate::storage::{StorageError, Store};
use crate::summary;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is locked")]
    Locked,
    #[error("wrong passphrase")]
    WrongPassphrase,
    #[error("a store already exists at {0}")]
    AlreadyInitialized(String),
    #[error("no store found at {0}")]
    NotInitialized(String),
    #[error("no entry with id {0}")]
    NotFound(Uuid),
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Partial profile edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub cycle_length_days: Option<u32>,
    pub period_length_days: Option<u32>,
    pub last_period_start: Option<NaiveDate>,
}

/// One user's unlocked view of their store.
///
/// Holds the passphrase and decrypted data only between `unlock`/`setup` and
/// `lock`; both are wiped on drop.
pub struct Session {
    store: Store,
    passphrase: Option<String>,
    data: Option<AppData>,
}

impl Session {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            passphrase: None,
            data: None,
        }
    }

    pub fn is_setup(&self) -> bool {
        self.store.exists()
    }

    pub fn is_unlocked(&self) -> bool {
        self.data.is_some()
    }

    /// Create an empty store and leave the session unlocked.
    pub fn setup(&mut self, passphrase: &str) -> Result<(), SessionError> {
        if self.store.exists() {
            return Err(SessionError::AlreadyInitialized(
                self.store.path().display().to_string(),
            ));
        }
        let data = AppData::default();
        self.store.save(passphrase, &data)?;
        info!(path = %self.store.path().display(), "store created");

        self.passphrase = Some(passphrase.to_owned());
        self.data = Some(data);
        Ok(())
    }

    pub fn unlock(&mut self, passphrase: &str) -> Result<(), SessionError> {
        if !self.store.exists() {
            return Err(SessionError::NotInitialized(
                self.store.path().display().to_string(),
            ));
        }
        match self.store.load(passphrase) {
            Ok(data) => {
                info!(entries = data.entries.len(), "session unlocked");
                self.passphrase = Some(passphrase.to_owned());
                self.data = Some(data);
                Ok(())
            }
            Err(StorageError::Crypto(CryptoError::Open)) => {
                warn!("unlock rejected");
                Err(SessionError::WrongPassphrase)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Wipe the passphrase and drop decrypted data.
    pub fn lock(&mut self) {
        if let Some(ref mut p) = self.passphrase {
            p.zeroize();
        }
        self.passphrase = None;
        self.data = None;
    }

    fn data(&self) -> Result<&AppData, SessionError> {
        self.data.as_ref().ok_or(SessionError::Locked)
    }

    fn save(&self) -> Result<(), SessionError> {
        match (self.passphrase.as_deref(), self.data.as_ref()) {
            (Some(p), Some(d)) => Ok(self.store.save(p, d)?),
            _ => Err(SessionError::Locked),
        }
    }

    /// Record a period and persist. Returns the new entry's id.
    pub fn log_period(
        &mut self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        notes: String,
    ) -> Result<Uuid, SessionError> {
        if let Some(end) = end {
            if end < start {
                return Err(SessionError::InvalidEntry(format!(
                    "period end {end} is before start {start}"
                )));
            }
        }
        let data = self.data.as_mut().ok_or(SessionError::Locked)?;
        let id = Uuid::new_v4();
        data.entries.push(CycleTrackerEntry {
            id,
            period_start_date: start,
            period_end_date: end,
            notes,
        });
        self.save()?;
        info!(%id, %start, "period logged");
        Ok(id)
    }

    pub fn delete_entry(&mut self, id: Uuid) -> Result<(), SessionError> {
        let data = self.data.as_mut().ok_or(SessionError::Locked)?;
        let before = data.entries.len();
        data.entries.retain(|e| e.id != id);
        if data.entries.len() == before {
            return Err(SessionError::NotFound(id));
        }
        self.save()?;
        info!(%id, "entry deleted");
        Ok(())
    }

    /// Logged periods, oldest first.
    pub fn entries(&self) -> Result<Vec<CycleTrackerEntry>, SessionError> {
        let mut entries = self.data()?.entries.clone();
        entries.sort_by_key(|e| e.period_start_date);
        Ok(entries)
    }

    pub fn profile(&self) -> Result<CycleProfile, SessionError> {
        Ok(self.data()?.profile.clone())
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<CycleProfile, SessionError> {
        if update.cycle_length_days.is_some_and(|d| !valid_cycle_length(d)) {
            return Err(SessionError::InvalidProfile(format!(
                "cycle length must be 1 to {MAX_CYCLE_LENGTH_DAYS} days"
            )));
        }
        if update.period_length_days.is_some_and(|d| !valid_period_length(d)) {
            return Err(SessionError::InvalidProfile(format!(
                "period length must be 1 to {MAX_PERIOD_LENGTH_DAYS} days"
            )));
        }
        let data = self.data.as_mut().ok_or(SessionError::Locked)?;
        let profile = &mut data.profile;
        if let Some(days) = update.cycle_length_days {
            profile.cycle_length_days = days;
        }
        if let Some(days) = update.period_length_days {
            profile.period_length_days = days;
        }
        if let Some(start) = update.last_period_start {
            profile.last_period_start = Some(start);
        }
        let updated = profile.clone();
        self.save()?;
        info!(
            cycle_length = updated.cycle_length_days,
            period_length = updated.period_length_days,
            "profile updated"
        );
        Ok(updated)
    }

    pub fn summary(
        &self,
        today: NaiveDate,
        settings: &PredictionSettings,
    ) -> Result<CycleSummary, SessionError> {
        let data = self.data()?;
        Ok(summary::compose(
            &data.profile,
            data.entries.iter().map(|e| Some(e.period_start_date)),
            today,
            settings,
        ))
    }

    pub fn export(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(self.data()?)
            .map_err(|e| SessionError::Storage(StorageError::Serialization(e)))
    }

    /// Lock and permanently delete the store.
    pub fn wipe(&mut self) -> Result<(), SessionError> {
        self.lock();
        self.store.wipe()?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.lock();
    }
}
