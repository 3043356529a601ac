//! Caller-level roster resolution
//!
//! Ties the caller identity to the aggregation pipeline: picks the
//! effective teacher id (impersonation aware), fetches the raw record from
//! the roster source and runs aggregation plus finalization. Rebuilt fresh
//! on every call; nothing is cached.

use elevarkiv_common::config::Config;
use elevarkiv_common::Result;
use tracing::info;

use crate::access::Caller;
use crate::roster::aggregate::{finalize_students, resolve_roster};
use crate::roster::types::{PersonData, TeacherData};
use crate::services::RosterSource;

/// Resolve the roster view for `caller`.
///
/// Teachers (and admins impersonating one) get their aggregated student
/// roster. An upstream miss means "no such teacher" and yields an empty
/// result, not an error. Leaders resolve to an empty roster: the rule for
/// which students a leader may see is not yet defined upstream, and the
/// access decision layer already honors the leader rationale once such a
/// pairing exists.
pub async fn resolve_teacher_data(
    source: &RosterSource,
    caller: &Caller,
    config: &Config,
    mask_ssn: bool,
) -> Result<TeacherData> {
    if caller.acts_as_teacher(&config.teacher_role) {
        let teacher_id = caller.effective_teacher_id();
        info!(
            caller = %caller.principal_name,
            teacher = %teacher_id,
            "Resolving roster"
        );

        let Some(record) = source.teacher_record(teacher_id).await? else {
            info!(teacher = %teacher_id, "Roster source has no record for teacher");
            return Ok(TeacherData::empty());
        };

        let person = PersonData {
            upn: record.upn.clone(),
            login_handle: record.login_handle.clone(),
            employee_number: record.employee_number.clone(),
            name: record.name.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
        };

        let aggregated = resolve_roster(&record.relationships);
        let students =
            finalize_students(aggregated.students, mask_ssn, config.iop_access_enabled);

        info!(
            teacher = %teacher_id,
            students = students.len(),
            rejected = aggregated.rejected.len(),
            "Roster resolved"
        );

        return Ok(TeacherData {
            person: Some(person),
            students,
            rejected_relationships: aggregated.rejected,
        });
    }

    if caller.acts_as_leader(&config.leader_role) {
        info!(caller = %caller.principal_name, "Leader roster derivation is not defined; returning empty roster");
        return Ok(TeacherData::empty());
    }

    Ok(TeacherData::empty())
}
