/// Authorization policy
///
/// Pure decision logic: given who is asking and what they want to do, allow
/// or deny. Nothing here touches storage; callers load the resource, ask the
/// policy, and only then mutate.
///
/// # Rules
///
/// | Action | Allowed for |
/// |---|---|
/// | `ViewAllTasks`, `AssignTask`, `ListAllUsers` | admins |
/// | `ViewOwnTasks`, `CreateTask` | any authenticated user |
/// | `ViewTask`, `EditTask`, `ToggleTask`, `DeleteTask` | admins and the task owner |
///
/// Anonymous requesters are denied everything with
/// [`DenyReason::Unauthenticated`].
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::policy::{decide, Action, Decision, Identity, Requester};
/// use uuid::Uuid;
///
/// let alice = Identity { user_id: Uuid::new_v4(), is_admin: false };
/// let requester = Requester::User(alice);
///
/// assert_eq!(decide(&requester, Action::ToggleTask { owner_id: alice.user_id }), Decision::Allow);
/// assert!(!decide(&requester, Action::ViewAllTasks).is_allowed());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// The authenticated principal behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID
    pub user_id: Uuid,

    /// Whether the user holds admin rights
    pub is_admin: bool,
}

impl Identity {
    /// Whether this identity owns a resource
    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id
    }
}

/// Who is making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    /// No valid session
    Anonymous,

    /// Resolved session
    User(Identity),
}

impl From<Option<Identity>> for Requester {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Requester::Anonymous, Requester::User)
    }
}

impl From<Identity> for Requester {
    fn from(identity: Identity) -> Self {
        Requester::User(identity)
    }
}

/// Actions subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// See every user's tasks
    ViewAllTasks,

    /// See one's own tasks
    ViewOwnTasks,

    /// Add a task owned by oneself
    CreateTask,

    /// List every account
    ListAllUsers,

    /// Move a task to another owner
    AssignTask,

    /// Open a single task
    ViewTask { owner_id: Uuid },

    /// Change title/description
    EditTask { owner_id: Uuid },

    /// Flip the completed flag
    ToggleTask { owner_id: Uuid },

    /// Remove a task
    DeleteTask { owner_id: Uuid },
}

/// Why an action was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Requester has no session
    Unauthenticated,

    /// Requester lacks the right
    Forbidden,
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn when(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::Forbidden)
        }
    }
}

/// Decides whether `requester` may perform `action`
pub fn decide(requester: &Requester, action: Action) -> Decision {
    let identity = match requester {
        Requester::Anonymous => return Decision::Deny(DenyReason::Unauthenticated),
        Requester::User(identity) => identity,
    };

    match action {
        Action::ViewAllTasks | Action::ListAllUsers | Action::AssignTask => {
            Decision::when(identity.is_admin)
        }
        Action::ViewOwnTasks | Action::CreateTask => Decision::Allow,
        Action::ViewTask { owner_id }
        | Action::EditTask { owner_id }
        | Action::ToggleTask { owner_id }
        | Action::DeleteTask { owner_id } => {
            Decision::when(identity.is_admin || identity.owns(owner_id))
        }
    }
}

/// Like [`decide`], but as a `Result` for `?` propagation
///
/// # Errors
///
/// - [`Error::Unauthenticated`] for anonymous requesters
/// - [`Error::Unauthorized`] when the requester lacks the right
pub fn require(requester: impl Into<Requester>, action: Action) -> Result<(), Error> {
    match decide(&requester.into(), action) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::Unauthenticated) => Err(Error::Unauthenticated),
        Decision::Deny(DenyReason::Forbidden) => Err(Error::Unauthorized),
    }
}
