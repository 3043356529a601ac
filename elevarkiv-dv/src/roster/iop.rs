//! IOP classifier
//!
//! Flags the schools where a student has a class containing one of the
//! qualifying individualized-education-plan courses. Subject teachers in
//! such classes can be granted file access even without contact-teacher
//! status, when the feature flag enables it.

use std::collections::BTreeSet;

use super::types::SchoolMembership;

/// Course codes that qualify a class for IOP special access
pub const IOP_COURSE_CODES: [&str; 5] = ["IOP1000", "IOP2000", "IOP3000", "IOP4000", "IOP5000"];

/// School numbers where any class contains a qualifying course.
///
/// Operates on a student's memberships; the typed model guarantees every
/// membership carries a class list and every class a subject list, so there
/// is nothing to probe for.
pub fn iop_school_numbers(schools: &[SchoolMembership]) -> BTreeSet<String> {
    schools
        .iter()
        .filter(|membership| {
            membership.classes.iter().any(|class| {
                class
                    .subjects
                    .iter()
                    .any(|subject| IOP_COURSE_CODES.contains(&subject.code.as_str()))
            })
        })
        .map(|membership| membership.school_number.clone())
        .collect()
}
