use super::TemplateModule;

pub const MODULE: TemplateModule = TemplateModule {
    slug: "resignation-letter",
    fields: &[
        "authorName",
        "authorEmail",
        "authorPhone",
        "resignationDate",
        "recipientName",
        "recipientDesignation",
        "companyName",
        "resignationStatement",
        "lastWorkingDay",
        "resignationReason",
        "gratitudeNote",
        "transitionOffer",
        "closingStatement",
        "signature",
    ],
    themes: &[
        ("classic", include_str!("../../templates/resignation_letter/classic.html")),
        ("modern", include_str!("../../templates/resignation_letter/modern.html")),
        ("minimal", include_str!("../../templates/resignation_letter/minimal.html")),
        ("traditional", include_str!("../../templates/resignation_letter/traditional.html")),
    ],
};
