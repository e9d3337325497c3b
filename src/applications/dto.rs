use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::applications::repo::{Application, ApplicationStatus, NewApplication};

/// Request body for creating an application. Status defaults to `saved`
/// when the client omits it.
#[derive(Debug, Deserialize)]
pub struct ApplicationCreate {
    pub company_name: String,
    pub role: String,
    pub location: Option<String>,
    pub recruiter: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_applied: Option<OffsetDateTime>,
    pub job_url: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
}

impl From<ApplicationCreate> for NewApplication {
    fn from(body: ApplicationCreate) -> Self {
        Self {
            company_name: body.company_name,
            role: body.role,
            location: body.location,
            recruiter: body.recruiter,
            date_applied: body.date_applied,
            job_url: body.job_url,
            notes: body.notes,
            status: body.status,
        }
    }
}

/// Field mask for partial updates. Required columns are plain `Option`:
/// absent means keep. Nullable columns are double `Option` so that an
/// absent key (outer `None`) and an explicit JSON `null` (inner `None`,
/// which clears the column) stay distinguishable.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationUpdate {
    pub company_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub recruiter: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option_rfc3339")]
    pub date_applied: Option<Option<OffsetDateTime>>,
    #[serde(default, deserialize_with = "double_option")]
    pub job_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

fn double_option_rfc3339<'de, D>(de: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(de).map(Some)
}

impl ApplicationUpdate {
    /// Overlay the mask on an existing record. Only supplied fields
    /// change; everything else keeps its current value.
    pub fn apply(&self, app: &mut Application) {
        if let Some(v) = &self.company_name {
            app.company_name = v.clone();
        }
        if let Some(v) = &self.role {
            app.role = v.clone();
        }
        if let Some(v) = self.status {
            app.status = v;
        }
        if let Some(v) = &self.location {
            app.location = v.clone();
        }
        if let Some(v) = &self.recruiter {
            app.recruiter = v.clone();
        }
        if let Some(v) = self.date_applied {
            app.date_applied = v;
        }
        if let Some(v) = &self.job_url {
            app.job_url = v.clone();
        }
        if let Some(v) = &self.notes {
            app.notes = v.clone();
        }
    }
}

/// Body of the delete confirmation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_application() -> Application {
        Application {
            id: 1,
            user_id: 7,
            company_name: "Acme".into(),
            role: "SWE".into(),
            location: Some("Remote".into()),
            recruiter: None,
            date_applied: None,
            job_url: Some("https://acme.example/jobs/1".into()),
            notes: Some("referral".into()),
            status: ApplicationStatus::Saved,
            last_activity: OffsetDateTime::now_utc(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn status_defaults_to_saved() {
        let body: ApplicationCreate =
            serde_json::from_str(r#"{"company_name": "Acme", "role": "SWE"}"#).unwrap();
        assert_eq!(body.status, ApplicationStatus::Saved);
    }

    #[test]
    fn status_uses_lowercase_tags() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Oa).unwrap(),
            r#""oa""#
        );
        let status: ApplicationStatus = serde_json::from_str(r#""interview""#).unwrap();
        assert_eq!(status, ApplicationStatus::Interview);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = serde_json::from_str::<ApplicationCreate>(
            r#"{"company_name": "Acme", "role": "SWE", "status": "ghosted"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn mask_distinguishes_absent_from_null() {
        let mask: ApplicationUpdate =
            serde_json::from_str(r#"{"notes": null, "status": "applied"}"#).unwrap();
        // notes supplied as explicit null: clear it
        assert_eq!(mask.notes, Some(None));
        // location not supplied at all: leave it alone
        assert_eq!(mask.location, None);
        assert_eq!(mask.status, Some(ApplicationStatus::Applied));
    }

    #[test]
    fn apply_touches_only_supplied_fields() {
        let mut app = sample_application();
        let mask: ApplicationUpdate = serde_json::from_str(r#"{"status": "interview"}"#).unwrap();
        mask.apply(&mut app);
        assert_eq!(app.status, ApplicationStatus::Interview);
        assert_eq!(app.company_name, "Acme");
        assert_eq!(app.role, "SWE");
        assert_eq!(app.location.as_deref(), Some("Remote"));
        assert_eq!(app.notes.as_deref(), Some("referral"));
    }

    #[test]
    fn apply_clears_field_on_explicit_null() {
        let mut app = sample_application();
        let mask: ApplicationUpdate = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        mask.apply(&mut app);
        assert_eq!(app.notes, None);
        assert_eq!(app.job_url.as_deref(), Some("https://acme.example/jobs/1"));
    }

    #[test]
    fn null_on_required_field_is_ignored() {
        let mut app = sample_application();
        let mask: ApplicationUpdate =
            serde_json::from_str(r#"{"company_name": null}"#).unwrap();
        assert_eq!(mask.company_name, None);
        mask.apply(&mut app);
        assert_eq!(app.company_name, "Acme");
    }

    #[test]
    fn mask_parses_rfc3339_dates() {
        let mask: ApplicationUpdate =
            serde_json::from_str(r#"{"date_applied": "2025-01-20T12:00:00Z"}"#).unwrap();
        let inner = mask.date_applied.expect("supplied").expect("non-null");
        assert_eq!(inner.year(), 2025);
    }
}
