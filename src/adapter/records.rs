use super::schema::{
    normalize_record, AdapterContext, AliasSchema, CanonicalRecord, DatePart, FieldRule, FieldSpec,
    StatusTable,
};
use crate::models::{Appointment, Blog, EntityKind, Faq, Inquiry, Testimonial};
use serde_json::Value;

pub(crate) const PUBLISHED: &str = "Published";

const ID: FieldSpec = FieldSpec {
    name: "id",
    rule: FieldRule::Id {
        aliases: &["id", "_id"],
    },
};

const PUBLISHED_SYNONYMS: &[(&str, &str)] = &[
    ("published", PUBLISHED),
    ("approve", PUBLISHED),
    ("approved", PUBLISHED),
    ("active", PUBLISHED),
    ("live", PUBLISHED),
];

pub static TESTIMONIAL_STATUS: StatusTable = StatusTable {
    synonyms: PUBLISHED_SYNONYMS,
    default: "Pending",
};

pub static BLOG_STATUS: StatusTable = StatusTable {
    synonyms: PUBLISHED_SYNONYMS,
    default: "Draft",
};

pub static INQUIRY_STATUS: StatusTable = StatusTable {
    synonyms: &[
        ("new", "New"),
        ("open", "New"),
        ("pending", "New"),
        ("in progress", "In Progress"),
        ("in_progress", "In Progress"),
        ("in-progress", "In Progress"),
        ("processing", "In Progress"),
        ("resolved", "Resolved"),
        ("closed", "Resolved"),
        ("done", "Resolved"),
        ("completed", "Resolved"),
    ],
    default: "New",
};

/// A canonical record type with a fixed alias schema.
pub trait FromCanonical: Sized {
    const KIND: EntityKind;

    fn schema() -> &'static AliasSchema;

    fn from_canonical(record: CanonicalRecord) -> Self;
}

/// Normalizes one raw backend object into `T`. Total: never fails.
pub fn normalize<T: FromCanonical>(raw: &Value, ctx: &AdapterContext) -> T {
    T::from_canonical(normalize_record(raw, T::schema(), ctx))
}

static APPOINTMENT_SCHEMA: AliasSchema = AliasSchema {
    fields: &[
        ID,
        FieldSpec {
            name: "firstName",
            rule: FieldRule::Text {
                aliases: &["firstName", "first_name", "patientFirstName"],
                fallback: "-",
            },
        },
        FieldSpec {
            name: "lastName",
            rule: FieldRule::Text {
                aliases: &["lastName", "last_name", "patientLastName"],
                fallback: "-",
            },
        },
        FieldSpec {
            name: "mobileNumber",
            rule: FieldRule::Text {
                aliases: &["mobileNumber", "mobile", "phone"],
                fallback: "-",
            },
        },
        FieldSpec {
            name: "treatmentType",
            rule: FieldRule::Text {
                aliases: &[
                    "typesOfTreatment",
                    "typeOfTreatment",
                    "treatmentType",
                    "appointmentType",
                ],
                fallback: "-",
            },
        },
        FieldSpec {
            name: "city",
            rule: FieldRule::Text {
                aliases: &["city"],
                fallback: "-",
            },
        },
        FieldSpec {
            name: "patient",
            rule: FieldRule::FullName {
                first: &["firstName", "first_name", "patientFirstName"],
                last: &["lastName", "last_name", "patientLastName"],
                aliases: &["patientName", "fullName", "name"],
                fallback: "Unknown",
            },
        },
    ],
};

impl FromCanonical for Appointment {
    const KIND: EntityKind = EntityKind::Appointments;

    fn schema() -> &'static AliasSchema {
        &APPOINTMENT_SCHEMA
    }

    fn from_canonical(mut r: CanonicalRecord) -> Self {
        Appointment {
            id: r.take_id("id"),
            first_name: r.take_text("firstName"),
            last_name: r.take_text("lastName"),
            mobile_number: r.take_text("mobileNumber"),
            treatment_type: r.take_text("treatmentType"),
            city: r.take_text("city"),
            patient: r.take_text("patient"),
        }
    }
}

static BLOG_SCHEMA: AliasSchema = AliasSchema {
    fields: &[
        ID,
        FieldSpec {
            name: "title",
            rule: FieldRule::Text {
                aliases: &["title", "name"],
                fallback: "Untitled",
            },
        },
        FieldSpec {
            name: "excerpt",
            rule: FieldRule::Text {
                aliases: &["excerpt", "summary", "description"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "content",
            rule: FieldRule::Text {
                aliases: &["content", "body"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "author",
            rule: FieldRule::Text {
                aliases: &["author", "authorName"],
                fallback: "Admin",
            },
        },
        FieldSpec {
            name: "date",
            rule: FieldRule::DatePrefix {
                aliases: &["date", "publishedAt", "createdAt"],
            },
        },
        FieldSpec {
            name: "status",
            rule: FieldRule::Status {
                aliases: &["status"],
                table: &BLOG_STATUS,
            },
        },
        FieldSpec {
            name: "views",
            rule: FieldRule::Number {
                aliases: &["views", "viewCount"],
                fallback: 0.0,
            },
        },
        FieldSpec {
            name: "image",
            rule: FieldRule::Image {
                aliases: &["image", "coverImage", "thumbnail"],
            },
        },
    ],
};

impl FromCanonical for Blog {
    const KIND: EntityKind = EntityKind::Blogs;

    fn schema() -> &'static AliasSchema {
        &BLOG_SCHEMA
    }

    fn from_canonical(mut r: CanonicalRecord) -> Self {
        Blog {
            id: r.take_id("id"),
            title: r.take_text("title"),
            excerpt: r.take_text("excerpt"),
            content: r.take_text("content"),
            author: r.take_text("author"),
            date: r.take_text("date"),
            status: r.take_text("status"),
            views: r.take_number("views"),
            image: r.take_url("image"),
        }
    }
}

static TESTIMONIAL_SCHEMA: AliasSchema = AliasSchema {
    fields: &[
        ID,
        FieldSpec {
            name: "patient",
            rule: FieldRule::Text {
                aliases: &["patient", "name"],
                fallback: "",
            },
        },
        // Range is enforced when writing, not when reading.
        FieldSpec {
            name: "rating",
            rule: FieldRule::Number {
                aliases: &["rating"],
                fallback: 5.0,
            },
        },
        FieldSpec {
            name: "date",
            rule: FieldRule::DatePrefix {
                aliases: &["date", "createdAt"],
            },
        },
        FieldSpec {
            name: "status",
            rule: FieldRule::Status {
                aliases: &["status"],
                table: &TESTIMONIAL_STATUS,
            },
        },
        FieldSpec {
            name: "comment",
            rule: FieldRule::Text {
                aliases: &["comment", "review", "message"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "likes",
            rule: FieldRule::Number {
                aliases: &["likes"],
                fallback: 0.0,
            },
        },
        FieldSpec {
            name: "image",
            rule: FieldRule::Image {
                aliases: &["image", "avatar", "photo"],
            },
        },
        FieldSpec {
            name: "youtubeLink",
            rule: FieldRule::Text {
                aliases: &["youtubeLink", "videoUrl"],
                fallback: "",
            },
        },
    ],
};

impl FromCanonical for Testimonial {
    const KIND: EntityKind = EntityKind::Testimonials;

    fn schema() -> &'static AliasSchema {
        &TESTIMONIAL_SCHEMA
    }

    fn from_canonical(mut r: CanonicalRecord) -> Self {
        Testimonial {
            id: r.take_id("id"),
            patient: r.take_text("patient"),
            rating: r.take_number("rating"),
            date: r.take_text("date"),
            status: r.take_text("status"),
            comment: r.take_text("comment"),
            likes: r.take_number("likes"),
            image: r.take_url("image"),
            youtube_link: r.take_text("youtubeLink"),
        }
    }
}

static FAQ_SCHEMA: AliasSchema = AliasSchema {
    fields: &[
        ID,
        FieldSpec {
            name: "question",
            rule: FieldRule::Text {
                aliases: &["question"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "answer",
            rule: FieldRule::Text {
                aliases: &["answer"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "category",
            rule: FieldRule::Text {
                aliases: &["category"],
                fallback: "General",
            },
        },
    ],
};

impl FromCanonical for Faq {
    const KIND: EntityKind = EntityKind::Faqs;

    fn schema() -> &'static AliasSchema {
        &FAQ_SCHEMA
    }

    fn from_canonical(mut r: CanonicalRecord) -> Self {
        Faq {
            id: r.take_id("id"),
            question: r.take_text("question"),
            answer: r.take_text("answer"),
            category: r.take_text("category"),
        }
    }
}

const INQUIRY_DATE_ALIASES: &[&str] = &["date", "createdAt", "updatedAt"];

static INQUIRY_SCHEMA: AliasSchema = AliasSchema {
    fields: &[
        ID,
        FieldSpec {
            name: "name",
            rule: FieldRule::Text {
                aliases: &["name", "fullName"],
                fallback: "Unknown",
            },
        },
        FieldSpec {
            name: "email",
            rule: FieldRule::Text {
                aliases: &["email"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "phone",
            rule: FieldRule::Text {
                aliases: &["phone", "mobile"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "subject",
            rule: FieldRule::Text {
                aliases: &["subject", "inquiryType"],
                fallback: "General Inquiry",
            },
        },
        FieldSpec {
            name: "message",
            rule: FieldRule::Text {
                aliases: &["message", "description"],
                fallback: "",
            },
        },
        FieldSpec {
            name: "date",
            rule: FieldRule::Timestamp {
                aliases: INQUIRY_DATE_ALIASES,
                part: DatePart::Date,
            },
        },
        FieldSpec {
            name: "time",
            rule: FieldRule::Timestamp {
                aliases: INQUIRY_DATE_ALIASES,
                part: DatePart::Time,
            },
        },
        FieldSpec {
            name: "status",
            rule: FieldRule::Status {
                aliases: &["status"],
                table: &INQUIRY_STATUS,
            },
        },
    ],
};

impl FromCanonical for Inquiry {
    const KIND: EntityKind = EntityKind::Inquiries;

    fn schema() -> &'static AliasSchema {
        &INQUIRY_SCHEMA
    }

    fn from_canonical(mut r: CanonicalRecord) -> Self {
        Inquiry {
            id: r.take_id("id"),
            name: r.take_text("name"),
            email: r.take_text("email"),
            phone: r.take_text("phone"),
            subject: r.take_text("subject"),
            message: r.take_text("message"),
            date: r.take_text("date"),
            time: r.take_text("time"),
            status: r.take_text("status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use serde_json::json;

    fn ctx() -> AdapterContext {
        AdapterContext::new("https://api.example.com/uploads/")
    }

    #[test]
    fn appointment_fallbacks() {
        let a: Appointment = normalize(&json!({}), &ctx());
        assert_eq!(
            a,
            Appointment {
                id: None,
                first_name: "-".into(),
                last_name: "-".into(),
                mobile_number: "-".into(),
                treatment_type: "-".into(),
                city: "-".into(),
                patient: "Unknown".into(),
            }
        );
    }

    #[test]
    fn appointment_aliases() {
        let a: Appointment = normalize(
            &json!({
                "_id": "66a1",
                "first_name": "Asha",
                "patientLastName": "Rao",
                "phone": 9876543210_i64,
                "appointmentType": "Consultation",
                "city": "Pune"
            }),
            &ctx(),
        );
        assert_eq!(a.id, Some(RecordId::Text("66a1".into())));
        assert_eq!(a.patient, "Asha Rao");
        assert_eq!(a.mobile_number, "9876543210");
        assert_eq!(a.treatment_type, "Consultation");
    }

    #[test]
    fn appointment_patient_falls_back_to_full_name_aliases() {
        let a: Appointment = normalize(&json!({"patientName": "Vikram Singh"}), &ctx());
        assert_eq!(a.first_name, "-");
        assert_eq!(a.patient, "Vikram Singh");
    }

    #[test]
    fn testimonial_numbers_and_status() {
        let t: Testimonial = normalize(
            &json!({"rating": "abc", "likes": "7", "status": "Approved", "avatar": "p/1.jpg"}),
            &ctx(),
        );
        assert_eq!(t.rating, 5.0);
        assert_eq!(t.likes, 7.0);
        assert_eq!(t.status, "Published");
        assert_eq!(
            t.image.as_deref(),
            Some("https://api.example.com/uploads/p/1.jpg")
        );

        let t: Testimonial = normalize(&json!({"rating": 9, "status": "rejected"}), &ctx());
        assert_eq!(t.rating, 9.0);
        assert_eq!(t.status, "Pending");
    }

    #[test]
    fn blog_defaults_to_draft() {
        let b: Blog = normalize(
            &json!({"title": "Gut health", "createdAt": "2024-02-10T08:00:00Z", "status": "LIVE"}),
            &ctx(),
        );
        assert_eq!(b.status, "Published");
        assert_eq!(b.date, "2024-02-10");
        assert_eq!(b.image, None);

        let b: Blog = normalize(&json!({"status": "whatever"}), &ctx());
        assert_eq!(b.status, "Draft");
        assert_eq!(b.title, "Untitled");
    }

    #[test]
    fn inquiry_dates_and_status() {
        let i: Inquiry = normalize(
            &json!({"fullName": "P", "createdAt": "2024-03-01T14:05:00Z", "status": "in_progress"}),
            &ctx(),
        );
        assert_eq!(i.date, "2024-03-01");
        assert_eq!(i.time, "14:05");
        assert_eq!(i.status, "In Progress");
        assert_eq!(i.subject, "General Inquiry");

        let i: Inquiry = normalize(&json!({"createdAt": "2024-03-01T19:35:00+05:30"}), &ctx());
        assert_eq!(i.time, "14:05");

        let i: Inquiry = normalize(&json!({"date": "not a date"}), &ctx());
        assert_eq!(i.date, "");
        assert_eq!(i.time, "");
        assert_eq!(i.status, "New");
        assert_eq!(i.name, "Unknown");
    }

    #[test]
    fn faq_category_default() {
        let f: Faq = normalize(&json!({"id": 4, "question": "Q?"}), &ctx());
        assert_eq!(f.id, Some(RecordId::Number(4)));
        assert_eq!(f.category, "General");
        assert_eq!(f.answer, "");
    }
}
