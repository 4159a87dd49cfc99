//! Resolves the calling account and the account whose time is being summed.

use chrono_tz::Tz;
use jira_api::{JiraClient, JiraError, UserInfo};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Api(#[from] JiraError),
    #[error("could not determine account id for {0}")]
    UnknownAccount(String),
    #[error("unrecognised time zone {zone:?} for {user}")]
    TimeZone { user: String, zone: String },
}

/// A Jira account together with the zone its dates are interpreted in.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: UserInfo,
    pub zone: Tz,
}

impl Identity {
    fn from_user(user: UserInfo) -> Result<Self, IdentityError> {
        let zone = parse_zone(&user)?;
        Ok(Self { user, zone })
    }

    pub fn account_id(&self) -> &str {
        &self.user.account_id
    }
}

/// Caller and target. They are the same account unless another user was requested.
#[derive(Debug, Clone)]
pub struct Identities {
    pub caller: Identity,
    pub target: Identity,
}

impl Identities {
    pub fn is_self_query(&self) -> bool {
        self.caller.account_id() == self.target.account_id()
    }
}

/// Looks up the caller via `myself` and, when `user_query` is set, the target via `user/search`.
///
/// Runs before any tally work starts, so rejected credentials surface here.
pub async fn resolve(client: &JiraClient, user_query: Option<&str>) -> Result<Identities, IdentityError> {
    let me = client.get_myself().await?;
    if me.account_id.trim().is_empty() {
        return Err(JiraError::Authentication(format!(
            "could not determine account id for {}",
            client.config().username
        ))
        .into());
    }
    let caller = Identity::from_user(me)?;
    debug!("caller {} ({})", caller.user.label(), caller.zone);

    let query = user_query.map(str::trim).filter(|query| !query.is_empty());
    let target = match query {
        None => caller.clone(),
        Some(query) => {
            let user = find_user(client, query).await?;
            let target = Identity::from_user(user)?;
            debug!("target {} ({})", target.user.label(), target.zone);
            target
        }
    };

    Ok(Identities { caller, target })
}

async fn find_user(client: &JiraClient, query: &str) -> Result<UserInfo, IdentityError> {
    let users = client.search_users(query).await?;
    let mut user = users
        .into_iter()
        .next()
        .filter(|user| !user.account_id.trim().is_empty())
        .ok_or_else(|| IdentityError::UnknownAccount(query.to_string()))?;
    if user.email_address.as_deref().map_or(true, str::is_empty) {
        user.email_address = Some(query.to_string());
    }
    Ok(user)
}

fn parse_zone(user: &UserInfo) -> Result<Tz, IdentityError> {
    match user.time_zone.as_deref().map(str::trim) {
        None | Some("") => Ok(Tz::UTC),
        Some(zone) => zone.parse::<Tz>().map_err(|_| IdentityError::TimeZone {
            user: user.label().to_string(),
            zone: zone.to_string(),
        }),
    }
}
