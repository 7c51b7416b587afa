//! The portal's search form.

/// Every field the search endpoint accepts.
///
/// The portal expects the complete field set on each POST, so unset fields
/// are sent as empty strings rather than omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub term: String,
    /// Encoded as one repeated `form-search-subject` key per code.
    pub subjects: Vec<String>,
    pub course: String,
    pub campus: String,
    pub crn: String,
    pub instructor: String,
    pub level: String,
    pub department: String,
    /// Seat status filter; `all` includes closed sections.
    pub status: String,
    pub schedule_type: String,
    pub instruction_method: String,
    pub begin_time: String,
    pub end_time: String,
    pub material_cost: String,
    pub keyword: String,
}

impl SearchForm {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            subjects: Vec::new(),
            course: String::new(),
            campus: String::new(),
            crn: String::new(),
            instructor: String::new(),
            level: String::new(),
            department: String::new(),
            status: "all".to_string(),
            schedule_type: String::new(),
            instruction_method: String::new(),
            begin_time: String::new(),
            end_time: String::new(),
            material_cost: String::new(),
            keyword: String::new(),
        }
    }

    /// The form used when harvesting a single subject on one campus.
    pub fn for_subject(term: &str, subject: &str, campus: &str) -> Self {
        Self {
            subjects: vec![subject.to_string()],
            campus: campus.to_string(),
            ..Self::new(term)
        }
    }

    /// Form-encodable key/value pairs in the order the portal's own form submits them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(15 + self.subjects.len());
        params.push(("form-search-semester", self.term.clone()));

        if self.subjects.is_empty() {
            params.push(("form-search-subject", String::new()));
        } else {
            for subject in &self.subjects {
                params.push(("form-search-subject", subject.clone()));
            }
        }

        params.extend([
            ("form-search-course", self.course.clone()),
            ("form-search-campus", self.campus.clone()),
            ("form-search-crn", self.crn.clone()),
            ("form-search-instructor", self.instructor.clone()),
            ("form-search-level", self.level.clone()),
            ("form-search-department", self.department.clone()),
            ("form-search-status", self.status.clone()),
            ("form-search-schedule-type", self.schedule_type.clone()),
            (
                "form-search-instruction-method",
                self.instruction_method.clone(),
            ),
            ("form-search-begin-time", self.begin_time.clone()),
            ("form-search-end-time", self.end_time.clone()),
            ("form-search-mat-cost", self.material_cost.clone()),
            ("form-search-keyword", self.keyword.clone()),
        ]);

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(params: &'a [(&'static str, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_for_subject_sets_term_subject_and_campus() {
        let params = SearchForm::for_subject("202601", "ART", "10").to_params();
        assert_eq!(values(&params, "form-search-semester"), vec!["202601"]);
        assert_eq!(values(&params, "form-search-subject"), vec!["ART"]);
        assert_eq!(values(&params, "form-search-campus"), vec!["10"]);
        assert_eq!(values(&params, "form-search-status"), vec!["all"]);
    }

    #[test]
    fn test_unset_fields_are_sent_empty() {
        let params = SearchForm::new("202601").to_params();
        assert_eq!(params.len(), 15);
        assert_eq!(values(&params, "form-search-subject"), vec![""]);
        for key in [
            "form-search-course",
            "form-search-crn",
            "form-search-instructor",
            "form-search-keyword",
            "form-search-mat-cost",
        ] {
            assert_eq!(values(&params, key), vec![""], "{key} should be empty");
        }
    }

    #[test]
    fn test_multiple_subjects_repeat_the_key() {
        let form = SearchForm {
            subjects: vec!["ART".to_string(), "CSCI".to_string()],
            ..SearchForm::new("202601")
        };
        let params = form.to_params();
        assert_eq!(values(&params, "form-search-subject"), vec!["ART", "CSCI"]);
        assert_eq!(params.len(), 16);
        // semester first, subjects immediately after
        assert_eq!(params[0].0, "form-search-semester");
        assert_eq!(params[1], ("form-search-subject", "ART".to_string()));
        assert_eq!(params[2], ("form-search-subject", "CSCI".to_string()));
    }
}
