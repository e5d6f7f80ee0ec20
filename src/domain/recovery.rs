use super::catalog::{FieldKind, FieldSpec, FormSpec, GroupSpec, ItemSpec, Rule};

/// Identifier under which drafts of this form are persisted.
pub const RECOVERY_FORM_ID: &str = "cctv-recovery-request";

/// How long recorded footage is typically kept before it is overwritten.
pub const FOOTAGE_RETENTION_DAYS: i64 = 31;

/// The built-in CCTV/DVR footage-recovery request form.
///
/// Top-level fields describe the requesting officer and the incident; each
/// recorder group describes one DVR on scene; each time-frame item inside a
/// group describes one window of footage to extract.
pub fn recovery_request() -> FormSpec {
    FormSpec {
        id: RECOVERY_FORM_ID.to_string(),
        title: "CCTV Footage Recovery Request".to_string(),
        fields: vec![
            FieldSpec::new("officerName", "Officer name", FieldKind::Text).required(),
            FieldSpec::new("officerEmail", "Officer email", FieldKind::Email)
                .required()
                .rule(Rule::EmailDomain("citypd.gov".to_string())),
            FieldSpec::new("officerPhone", "Contact phone", FieldKind::Phone)
                .required()
                .rule(Rule::DigitCount(10))
                .hint("10 digits, no separators"),
            FieldSpec::new("badgeNumber", "Badge number", FieldKind::Text)
                .required()
                .rule(Rule::Prefix("PD-".to_string())),
            FieldSpec::new("caseNumber", "Case number", FieldKind::Text)
                .required()
                .rule(Rule::Prefix("CR-".to_string())),
            FieldSpec::new("incidentDate", "Incident date", FieldKind::Date)
                .required()
                .rule(Rule::NotFuture)
                .rule(Rule::WithinPastDays(FOOTAGE_RETENTION_DAYS))
                .hint("Footage is usually overwritten after 31 days"),
            FieldSpec::new("incidentAddress", "Incident address", FieldKind::TextArea)
                .required()
                .rule(Rule::ContainsDigit)
                .hint("Include the street number"),
            FieldSpec::new("incidentSummary", "Incident summary", FieldKind::TextArea),
        ],
        group: GroupSpec {
            title: "Recorder".to_string(),
            fields: vec![
                FieldSpec::new("dvrLocation", "Recorder location", FieldKind::Text).required(),
                FieldSpec::new(
                    "dvrMake",
                    "Recorder make",
                    FieldKind::Select(vec![
                        "Hikvision".to_string(),
                        "Dahua".to_string(),
                        "Axis".to_string(),
                        "Bosch".to_string(),
                        "Other".to_string(),
                    ]),
                )
                .required(),
                FieldSpec::new("dvrMakeOther", "Recorder make (other)", FieldKind::Text)
                    .conditional_on("dvrMake", "Other"),
                FieldSpec::new("dvrPassword", "Recorder password", FieldKind::Text),
                FieldSpec::new("cameraCount", "Camera count", FieldKind::Text)
                    .required()
                    .rule(Rule::IntRange { min: 1, max: 64 }),
                FieldSpec::new(
                    "timeCorrect",
                    "Recorder clock correct?",
                    FieldKind::Radio(vec!["Yes".to_string(), "No".to_string()]),
                )
                .required(),
                FieldSpec::new("timeOffset", "Clock offset (minutes)", FieldKind::Text)
                    .conditional_on("timeCorrect", "No")
                    .rule(Rule::IntRange {
                        min: -1440,
                        max: 1440,
                    })
                    .hint("Recorder time minus real time"),
            ],
            item: ItemSpec {
                title: "Time-frame".to_string(),
                fields: vec![
                    FieldSpec::new("startTime", "Start", FieldKind::DateTime)
                        .required()
                        .rule(Rule::NotFuture),
                    FieldSpec::new("endTime", "End", FieldKind::DateTime)
                        .required()
                        .rule(Rule::NotFuture)
                        .rule(Rule::AfterSibling {
                            base: "startTime".to_string(),
                        }),
                    FieldSpec::new("cameraDetails", "Cameras of interest", FieldKind::TextArea)
                        .required()
                        .hint("Camera numbers or views covering the incident"),
                ],
            },
        },
    }
}
