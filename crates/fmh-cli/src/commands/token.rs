use std::path::Path;

use fmh_core::error::LogbookError;
use fmh_core::model::Identity;
use fmh_core::store::IdentityStore;

pub fn issue(db: &Path, user: &str, email: Option<String>) -> Result<(), LogbookError> {
    let mut identity = Identity::new(user);
    if let Some(email) = email {
        identity = identity.with_email(email);
    }

    let store = super::open_store(db)?;
    let token = store.issue_token(&identity)?;
    eprintln!("Token for {user} (shown once, only its hash is stored):");
    println!("{token}");
    Ok(())
}
