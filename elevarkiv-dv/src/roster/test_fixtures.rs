//! Shared builders for roster tests

use super::types::{
    GroupStudent, RawGroup, RawSchool, RawTeacherRecord, RawTeachingRelationship, Subject,
};

pub fn school(school_number: &str) -> RawSchool {
    RawSchool {
        school_number: school_number.to_string(),
        short_name: format!("UT-SKOLE{}", school_number),
        name: format!("Skole {}", school_number),
    }
}

pub fn relationship(
    id: &str,
    active: bool,
    description: &str,
    school_number: &str,
) -> RawTeachingRelationship {
    RawTeachingRelationship {
        id: id.to_string(),
        active,
        description: description.to_string(),
        school: school(school_number),
        base_groups: Vec::new(),
        contact_teacher_groups: Vec::new(),
        teaching_groups: Vec::new(),
    }
}

pub fn group(id: &str, active: bool, students: Vec<GroupStudent>) -> RawGroup {
    RawGroup {
        id: id.to_string(),
        name: format!("Gruppe {}", id),
        active,
        subjects: Vec::new(),
        students,
    }
}

pub fn subject_group(
    id: &str,
    subjects: Vec<Subject>,
    students: Vec<GroupStudent>,
) -> RawGroup {
    RawGroup {
        id: id.to_string(),
        name: format!("Gruppe {}", id),
        active: true,
        subjects,
        students,
    }
}

pub fn subject(code: &str) -> Subject {
    Subject {
        id: format!("fag-{}", code),
        code: code.to_string(),
    }
}

pub fn student_in_group(student_number: &str, contact_teacher: bool) -> GroupStudent {
    GroupStudent {
        student_number: student_number.to_string(),
        name: format!("Elev {}", student_number),
        first_name: "Elev".to_string(),
        last_name: student_number.to_string(),
        login_handle: Some(format!("elev{}@skole.example.no", student_number)),
        national_id: format!("0101{}99999", student_number),
        contact_teacher,
    }
}

pub fn student_without_login(student_number: &str) -> GroupStudent {
    GroupStudent {
        login_handle: None,
        ..student_in_group(student_number, false)
    }
}

pub fn teacher_record(relationships: Vec<RawTeachingRelationship>) -> RawTeacherRecord {
    RawTeacherRecord {
        upn: "kari.nordmann@example.no".to_string(),
        login_handle: "karinor@skole.example.no".to_string(),
        employee_number: "700001".to_string(),
        name: "Kari Nordmann".to_string(),
        first_name: "Kari".to_string(),
        last_name: "Nordmann".to_string(),
        relationships,
    }
}
