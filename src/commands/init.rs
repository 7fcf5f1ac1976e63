use crate::args::InitArgs;
use crate::commands::Out;
use crate::session::{FileStore, SessionUser, JWT_KEY, USER_KEY};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates `$BILLED_HOME` with its `config.json`, and records the employee in the session file.
///
/// Running it again overwrites the configuration and the session.
pub async fn init(billed_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(billed_home, args.api_url()).await?;

    let user = SessionUser {
        user_type: args.user_type().to_string(),
        email: args.email().to_string(),
    };
    let mut store = FileStore::load(config.session_path()).await?;
    store.set_item(
        USER_KEY,
        serde_json::to_string(&user).context("Unable to serialize the session user")?,
    );
    if let Some(jwt) = args.jwt() {
        store.set_item(JWT_KEY, jwt);
    }
    store.save().await?;

    Ok(Out::new_message(format!(
        "Billed is ready for {} at {}",
        user.email,
        config.root().display()
    )))
}
