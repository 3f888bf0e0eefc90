//! JSON file adapter for the [`RecordStore`] port.
//!
//! Layout under the data directory:
//!
//! ```text
//! identity_index.json
//! <platformId>/profile.json
//! <platformId>/friends.json
//! <platformId>/conversations.json
//! ```
//!
//! Every file is written to a staging name and renamed into place, so a
//! crash mid-flush leaves either the old or the new record.

mod schema;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::ports::{FlushReport, RecordStore, RecordStoreError};
use crate::domain::{Account, Message, PlatformId, PublicId, StoreSnapshot};

use self::schema::{
    ConversationsRecord, FriendsRecord, IdentityIndexRecord, LegacyFriends, LegacyHistory,
    LegacyProfile, ProfileRecord, Versioned, decode,
};

pub const PROFILE_FILE: &str = "profile.json";
pub const FRIENDS_FILE: &str = "friends.json";
pub const CONVERSATIONS_FILE: &str = "conversations.json";
pub const IDENTITY_INDEX_FILE: &str = "identity_index.json";
const LEGACY_HISTORY_FILE: &str = "message_history.json";
const LEGACY_INDEX_FILE: &str = "uid_to_tid.json";

/// Record store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    root: PathBuf,
}

impl JsonRecordStore {
    /// Use `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RecordStoreError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|err| RecordStoreError::unavailable(describe(&root, &err)))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn root_dir(&self) -> Result<Dir, RecordStoreError> {
        Dir::open_ambient_dir(&self.root, ambient_authority())
            .map_err(|err| RecordStoreError::unavailable(describe(&self.root, &err)))
    }

    fn load_account(&self, dir: &Dir, name: &str) -> Result<Account, RecordStoreError> {
        let path = |file: &str| self.root.join(name).join(file).display().to_string();

        let bytes = dir
            .read(PROFILE_FILE)
            .map_err(|err| RecordStoreError::corrupt(path(PROFILE_FILE), err.to_string()))?;
        let profile = match decode::<ProfileRecord, LegacyProfile>(&bytes)
            .map_err(|message| RecordStoreError::corrupt(path(PROFILE_FILE), message))?
        {
            Versioned::Current(record) => record.into(),
            Versioned::Legacy(legacy) => {
                debug!(user = %name, "migrating legacy profile");
                legacy
                    .migrate()
                    .map_err(|message| RecordStoreError::corrupt(path(PROFILE_FILE), message))?
            }
        };

        let friends = match read_optional(dir, FRIENDS_FILE)
            .map_err(|err| RecordStoreError::corrupt(path(FRIENDS_FILE), err.to_string()))?
        {
            None => Default::default(),
            Some(bytes) => match decode::<FriendsRecord, LegacyFriends>(&bytes)
                .map_err(|message| RecordStoreError::corrupt(path(FRIENDS_FILE), message))?
            {
                Versioned::Current(record) => record.friends,
                Versioned::Legacy(list) => schema::migrate_friends(&list),
            },
        };

        let ledgers = match read_optional(dir, CONVERSATIONS_FILE).map_err(|err| {
            RecordStoreError::corrupt(path(CONVERSATIONS_FILE), err.to_string())
        })? {
            Some(bytes) => match decode::<ConversationsRecord, LegacyHistory>(&bytes)
                .map_err(|message| RecordStoreError::corrupt(path(CONVERSATIONS_FILE), message))?
            {
                Versioned::Current(record) => record.ledgers,
                Versioned::Legacy(history) => schema::migrate_history(history),
            },
            None => self.load_legacy_history(dir, name)?,
        };

        Ok(Account {
            profile,
            friends,
            ledgers,
        })
    }

    fn load_legacy_history(
        &self,
        dir: &Dir,
        name: &str,
    ) -> Result<BTreeMap<PublicId, Vec<Message>>, RecordStoreError> {
        let path = self.root.join(name).join(LEGACY_HISTORY_FILE);
        let Some(bytes) = read_optional(dir, LEGACY_HISTORY_FILE)
            .map_err(|err| RecordStoreError::corrupt(path.display().to_string(), err.to_string()))?
        else {
            return Ok(BTreeMap::new());
        };
        let history: LegacyHistory = serde_json::from_slice(&bytes)
            .map_err(|err| RecordStoreError::corrupt(path.display().to_string(), err.to_string()))?;
        debug!(user = %name, "migrating legacy message history");
        Ok(schema::migrate_history(history))
    }

    fn save_account(&self, root: &Dir, account: &Account) -> Result<(), RecordStoreError> {
        let name = account.profile.platform_id.to_string();
        let account_root = self.root.join(&name);
        let write_err = |file: &str, err: io::Error| {
            RecordStoreError::write(account_root.join(file).display().to_string(), err.to_string())
        };

        root.create_dir_all(&name).map_err(|err| write_err("", err))?;
        let dir = root.open_dir(&name).map_err(|err| write_err("", err))?;

        write_json(&dir, PROFILE_FILE, &ProfileRecord::from(&account.profile))
            .map_err(|err| write_err(PROFILE_FILE, err))?;
        write_json(&dir, FRIENDS_FILE, &FriendsRecord::new(&account.friends))
            .map_err(|err| write_err(FRIENDS_FILE, err))?;
        write_json(
            &dir,
            CONVERSATIONS_FILE,
            &ConversationsRecord::new(&account.ledgers),
        )
        .map_err(|err| write_err(CONVERSATIONS_FILE, err))?;
        Ok(())
    }
}

impl RecordStore for JsonRecordStore {
    fn load(&self) -> Result<StoreSnapshot, RecordStoreError> {
        let root = self.root_dir()?;
        let entries = root
            .entries()
            .map_err(|err| RecordStoreError::unavailable(describe(&self.root, &err)))?;

        let mut accounts = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Ok(platform_id) = name.parse::<i64>().map(PlatformId::new) else {
                continue;
            };
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let loaded = root
                .open_dir(name)
                .map_err(|err| {
                    RecordStoreError::corrupt(
                        self.root.join(name).display().to_string(),
                        err.to_string(),
                    )
                })
                .and_then(|dir| self.load_account(&dir, name));
            match loaded {
                Ok(account) if account.profile.platform_id == platform_id => accounts.push(account),
                Ok(account) => error!(
                    directory = %name,
                    recorded = %account.profile.platform_id,
                    "profile platform id does not match its directory; skipping"
                ),
                Err(err) => error!(error = %err, "skipping unreadable user records"),
            }
        }
        accounts.sort_by_key(Account::public_id);

        if root.exists(LEGACY_INDEX_FILE) {
            debug!("legacy identity index present; the index is rebuilt from profiles");
        }
        info!(users = accounts.len(), root = %self.root.display(), "loaded user records");
        Ok(StoreSnapshot { accounts })
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<FlushReport, RecordStoreError> {
        let root = self.root_dir()?;
        let mut report = FlushReport::default();

        for account in &snapshot.accounts {
            match self.save_account(&root, account) {
                Ok(()) => report.written += 1,
                Err(err) => {
                    error!(error = %err, public_id = %account.public_id(), "failed to persist user");
                    report.failed += 1;
                }
            }
        }

        let index = IdentityIndexRecord {
            version: schema::CURRENT_VERSION,
            entries: snapshot
                .accounts
                .iter()
                .map(|a| (a.public_id(), a.profile.platform_id))
                .collect(),
        };
        if let Err(err) = write_json(&root, IDENTITY_INDEX_FILE, &index) {
            error!(error = %err, "failed to persist identity index");
            report.failed += 1;
        }

        Ok(report)
    }
}

fn read_optional(dir: &Dir, name: &str) -> io::Result<Option<Vec<u8>>> {
    match dir.read(name) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn write_json<T: Serialize>(dir: &Dir, name: &str, value: &T) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    let staging = format!(".{name}.{}.tmp", Uuid::new_v4().simple());
    dir.write(&staging, bytes)?;
    if let Err(err) = dir.rename(&staging, dir, name) {
        let _cleanup = dir.remove_file(&staging);
        return Err(err);
    }
    Ok(())
}

fn describe(path: &Path, err: &io::Error) -> String {
    format!("{}: {err}", path.display())
}
