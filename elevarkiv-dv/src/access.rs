//! Access decision resolver
//!
//! Decides, for one caller and one resolved roster student, whether files
//! may be viewed and under which rationale. The function is pure: feature
//! flags arrive as explicit policy, never from ambient process state.

use serde::{Deserialize, Serialize};

use elevarkiv_common::config::Config;

use crate::roster::Student;

/// Caller record supplied by the authentication layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub principal_id: String,
    pub principal_name: String,
    pub name: String,
    pub active_role: String,
    pub has_admin_role: bool,
    #[serde(default)]
    pub impersonating: Option<Impersonation>,
}

/// Admin-chosen impersonation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impersonation {
    pub target: String,
    #[serde(rename = "type")]
    pub kind: ImpersonationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpersonationKind {
    #[serde(rename = "larer")]
    Teacher,
    #[serde(rename = "leder")]
    Leader,
}

impl ImpersonationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpersonationKind::Teacher => "larer",
            ImpersonationKind::Leader => "leder",
        }
    }
}

impl std::str::FromStr for ImpersonationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "larer" => Ok(ImpersonationKind::Teacher),
            "leder" => Ok(ImpersonationKind::Leader),
            other => Err(format!("unknown impersonation kind: {}", other)),
        }
    }
}

impl Caller {
    fn impersonates(&self, kind: ImpersonationKind) -> bool {
        self.has_admin_role
            && self
                .impersonating
                .as_ref()
                .is_some_and(|imp| imp.kind == kind)
    }

    /// True when the caller acts as a teacher: directly, or as an admin
    /// impersonating one
    pub fn acts_as_teacher(&self, teacher_role: &str) -> bool {
        self.active_role == teacher_role || self.impersonates(ImpersonationKind::Teacher)
    }

    /// True when the caller acts as a leader: directly, or as an admin
    /// impersonating one
    pub fn acts_as_leader(&self, leader_role: &str) -> bool {
        self.active_role == leader_role || self.impersonates(ImpersonationKind::Leader)
    }

    /// The teacher identity the roster should be resolved for: the
    /// impersonation target when an admin impersonates a teacher, the
    /// caller's own principal name otherwise
    pub fn effective_teacher_id(&self) -> &str {
        if self.impersonates(ImpersonationKind::Teacher) {
            if let Some(imp) = &self.impersonating {
                return &imp.target;
            }
        }
        &self.principal_name
    }
}

/// Explicit flag set consumed by [`decide`]
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub leader_role: String,
    /// Every teacher may open files for their students
    pub faglarer_access_enabled: bool,
    /// Subject teachers get access through IOP-qualifying classes
    pub iop_access_enabled: bool,
}

impl AccessPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            leader_role: config.leader_role.clone(),
            faglarer_access_enabled: config.faglarer_access_enabled,
            iop_access_enabled: config.iop_access_enabled,
        }
    }
}

/// Rationale under which file access was granted (or denied)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessReason {
    Leader,
    Kontaktlarer,
    Faglarer,
    Iop,
    None,
}

impl AccessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessReason::Leader => "leader",
            AccessReason::Kontaktlarer => "kontaktlarer",
            AccessReason::Faglarer => "faglarer",
            AccessReason::Iop => "iop",
            AccessReason::None => "none",
        }
    }
}

impl std::str::FromStr for AccessReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leader" => Ok(AccessReason::Leader),
            "kontaktlarer" => Ok(AccessReason::Kontaktlarer),
            "faglarer" => Ok(AccessReason::Faglarer),
            "iop" => Ok(AccessReason::Iop),
            "none" => Ok(AccessReason::None),
            other => Err(format!("unknown access reason: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub access: bool,
    pub reason: AccessReason,
}

/// Decide file access for `caller` on `student`.
///
/// Evaluation order is load-bearing, first match wins:
/// 1. leader role (no roster relationship required)
/// 2. contact-teacher membership
/// 3. the all-teachers flag
/// 4. the IOP flag plus an IOP-tagged membership
///
/// The teacher-based reasons presuppose that the caller already appears in
/// the resolved roster for this student; that check belongs to the layer
/// above.
pub fn decide(caller: &Caller, student: &Student, policy: &AccessPolicy) -> AccessDecision {
    if caller.acts_as_leader(&policy.leader_role) {
        return AccessDecision {
            access: true,
            reason: AccessReason::Leader,
        };
    }

    if student.schools.iter().any(|m| m.contact_teacher) {
        return AccessDecision {
            access: true,
            reason: AccessReason::Kontaktlarer,
        };
    }

    if policy.faglarer_access_enabled {
        return AccessDecision {
            access: true,
            reason: AccessReason::Faglarer,
        };
    }

    if policy.iop_access_enabled && student.schools.iter().any(|m| m.iop) {
        return AccessDecision {
            access: true,
            reason: AccessReason::Iop,
        };
    }

    AccessDecision {
        access: false,
        reason: AccessReason::None,
    }
}
