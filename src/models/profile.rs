use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// The closed set of user classifications.
///
/// Drives both what the dashboard shows and what the user may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileType {
    #[serde(rename = "SuperAdmin")]
    SuperAdmin,
    #[serde(rename = "Umum")]
    General,
    #[serde(rename = "Guru")]
    Teacher,
    #[serde(rename = "Siswa")]
    Student,
    #[serde(rename = "OrangTua")]
    Parent,
}

impl ProfileType {
    /// The top administrative level.
    pub const TOP_LEVEL: ProfileType = ProfileType::SuperAdmin;

    /// Returns the wire name of the profile type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::SuperAdmin => "SuperAdmin",
            ProfileType::General => "Umum",
            ProfileType::Teacher => "Guru",
            ProfileType::Student => "Siswa",
            ProfileType::Parent => "OrangTua",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Teacher details attached to a `Guru` profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherInfo {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// National teacher registration number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip: Option<String>,
}

/// Student details attached to a `Siswa` profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// School-issued student number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Parent details attached to an `OrangTua` profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentInfo {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// The profile type together with the role record it may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    General,
    Teacher(Option<TeacherInfo>),
    Student(Option<StudentInfo>),
    Parent(Option<ParentInfo>),
}

impl Role {
    pub fn profile_type(&self) -> ProfileType {
        match self {
            Role::SuperAdmin => ProfileType::SuperAdmin,
            Role::General => ProfileType::General,
            Role::Teacher(_) => ProfileType::Teacher,
            Role::Student(_) => ProfileType::Student,
            Role::Parent(_) => ProfileType::Parent,
        }
    }
}

/// Snapshot of the authenticated user kept on the device.
///
/// Carries no credential. Serializes to the flat shape the backend sends,
/// minus the `token` field. Timestamps are kept exactly as the backend
/// formatted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRecord", into = "ProfileRecord")]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Profile {
    pub fn profile_type(&self) -> ProfileType {
        self.role.profile_type()
    }
}

/// Flat wire shape of a [`Profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: i64,
    pub username: String,
    pub profile_type: ProfileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentInfo>,
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = ProfileError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let ProfileRecord {
            id,
            username,
            profile_type,
            created_at,
            updated_at,
            teacher,
            student,
            parent,
        } = record;

        let mismatch = |record| ProfileError {
            profile_type: profile_type.as_str(),
            record,
        };

        let role = match (profile_type, teacher, student, parent) {
            (ProfileType::Teacher, teacher, None, None) => Role::Teacher(teacher),
            (ProfileType::Student, None, student, None) => Role::Student(student),
            (ProfileType::Parent, None, None, parent) => Role::Parent(parent),
            (ProfileType::SuperAdmin, None, None, None) => Role::SuperAdmin,
            (ProfileType::General, None, None, None) => Role::General,
            (_, Some(_), _, _) if profile_type != ProfileType::Teacher => {
                return Err(mismatch("teacher"));
            }
            (_, _, Some(_), _) if profile_type != ProfileType::Student => {
                return Err(mismatch("student"));
            }
            _ => return Err(mismatch("parent")),
        };

        Ok(Profile {
            id,
            username,
            role,
            created_at,
            updated_at,
        })
    }
}

impl From<Profile> for ProfileRecord {
    fn from(profile: Profile) -> Self {
        let profile_type = profile.profile_type();
        let (teacher, student, parent) = match profile.role {
            Role::Teacher(info) => (info, None, None),
            Role::Student(info) => (None, info, None),
            Role::Parent(info) => (None, None, info),
            Role::SuperAdmin | Role::General => (None, None, None),
        };

        ProfileRecord {
            id: profile.id,
            username: profile.username,
            profile_type,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
            teacher,
            student,
            parent,
        }
    }
}

/// The identity handed to the dashboard chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub profile_type: ProfileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentInfo>,
}

impl From<Profile> for Identity {
    fn from(profile: Profile) -> Self {
        let record = ProfileRecord::from(profile);

        Identity {
            id: record.id,
            username: record.username,
            profile_type: record.profile_type,
            created_at: record.created_at,
            updated_at: record.updated_at,
            teacher: record.teacher,
            student: record.student,
            parent: record.parent,
        }
    }
}
