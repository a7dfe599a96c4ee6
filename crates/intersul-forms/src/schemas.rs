//! The console's form schemas.
//!
//! Field names follow the API's snake_case keys, so a checked form decodes
//! straight into the matching request type.

use serde_json::{Map, Value};

use crate::schema::{Field, Schema};

/// Wire values of `UserRole`.
pub const USER_ROLES: [&str; 4] = ["admin", "manager", "technician", "commercial"];

/// Wire values of `ClientStatus`.
pub const CLIENT_STATUSES: [&str; 3] = ["active", "inactive", "suspended"];

/// Wire values of `ServiceStatus`.
pub const SERVICE_STATUSES: [&str; 5] =
    ["pending", "in_progress", "completed", "cancelled", "on_hold"];

/// Wire values of `ServicePriority`.
pub const SERVICE_PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

/// Brazilian phone number, e.g. `(48) 99999-1234`.
pub const PHONE_PATTERN: &str = r"^\(\d{2}\)\s\d{4,5}-\d{4}$";

/// `#RRGGBB`, any case.
pub const COLOR_PATTERN: &str = r"(?i)^#[0-9A-F]{6}$";

const PASSWORD_MISMATCH: &str = "Passwords don't match";
const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
const PRICE_NEGATIVE: &str = "Price must be positive";

fn email() -> Field {
    Field::string().email("Invalid email address")
}

fn password() -> Field {
    Field::string().min_len(6, "Password must be at least 6 characters")
}

fn phone() -> Field {
    Field::string()
        .pattern(PHONE_PATTERN, "Invalid phone format (XX) XXXXX-XXXX")
        .optional()
}

fn name() -> Field {
    Field::string().min_len(2, NAME_TOO_SHORT)
}

fn text() -> Field {
    Field::string().optional()
}

fn id() -> Field {
    Field::number()
}

fn at_least(min: f64) -> Field {
    Field::number().min(min, format!("Number must be greater than or equal to {}", min))
}

fn page() -> Field {
    at_least(1.0).optional()
}

fn limit() -> Field {
    at_least(1.0)
        .max(100.0, "Number must be less than or equal to 100")
        .optional()
}

fn same(a: &'static str, b: &'static str) -> impl Fn(&Map<String, Value>) -> bool {
    move |form| form.get(a) == form.get(b)
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

pub fn login() -> Schema {
    Schema::new()
        .field("email", email())
        .field("password", Field::string().min_len(1, "Password is required"))
}

pub fn register() -> Schema {
    Schema::new()
        .field("name", name())
        .field("email", email())
        .field("password", password())
        .field("confirm_password", Field::string())
        .field("role", Field::enumeration(USER_ROLES).optional())
        .field("phone", phone())
        .field("position", text())
        .refine(
            same("password", "confirm_password"),
            "confirm_password",
            PASSWORD_MISMATCH,
        )
}

pub fn change_password() -> Schema {
    Schema::new()
        .field(
            "current_password",
            Field::string().min_len(1, "Current password is required"),
        )
        .field("new_password", password())
        .field("confirm_password", Field::string())
        .refine(
            same("new_password", "confirm_password"),
            "confirm_password",
            PASSWORD_MISMATCH,
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

pub fn client() -> Schema {
    Schema::new()
        .field("name", name())
        .field("email", email())
        .field("phone", phone())
        .field("address", text())
        .field("city", text())
        .field("state", text())
        .field("zip_code", text())
        .field("company", text())
        .field("contact_person", text())
        .field("notes", text())
        .field("status", Field::enumeration(CLIENT_STATUSES).optional())
}

pub fn update_client() -> Schema {
    client().partial().extend(Schema::new().field("id", id()))
}

pub fn client_query() -> Schema {
    Schema::new()
        .field("search", text())
        .field("status", Field::enumeration(CLIENT_STATUSES).optional())
        .field("city", text())
        .field("state", text())
        .field("page", page())
        .field("limit", limit())
}

// ─────────────────────────────────────────────────────────────────────────────
// Services
// ─────────────────────────────────────────────────────────────────────────────

pub fn service() -> Schema {
    Schema::new()
        .field(
            "title",
            Field::string().min_len(2, "Title must be at least 2 characters"),
        )
        .field("description", text())
        .field("category_id", Field::number().min(1.0, "Category is required"))
        .field("client_id", Field::number().min(1.0, "Client is required"))
        .field("assigned_to_id", Field::number().optional())
        .field("client_copy_machine_id", Field::number().optional())
        .field("scheduled_date", text())
        .field(
            "estimated_duration",
            Field::number()
                .min(1.0, "Duration must be at least 1 minute")
                .optional(),
        )
        .field("notes", text())
        .field("priority", Field::enumeration(SERVICE_PRIORITIES).optional())
}

pub fn update_service() -> Schema {
    service().partial().extend(
        Schema::new()
            .field("id", id())
            .field("status", Field::enumeration(SERVICE_STATUSES).optional())
            .field("actual_duration", Field::number().optional())
            .field("completed_date", text()),
    )
}

pub fn service_category() -> Schema {
    Schema::new()
        .field("name", name())
        .field("description", text())
        .field(
            "color",
            Field::string()
                .pattern(COLOR_PATTERN, "Invalid color format")
                .optional(),
        )
}

pub fn service_query() -> Schema {
    Schema::new()
        .field("category_id", Field::number().optional())
        .field("client_id", Field::number().optional())
        .field("client_copy_machine_id", Field::number().optional())
        .field("status", Field::enumeration(SERVICE_STATUSES).optional())
        .field("priority", Field::enumeration(SERVICE_PRIORITIES).optional())
        .field("assigned_to_id", Field::number().optional())
        .field("scheduled_date_from", text())
        .field("scheduled_date_to", text())
        .field("search", text())
        .field("page", page())
        .field("limit", limit())
}

// ─────────────────────────────────────────────────────────────────────────────
// Copy machines
// ─────────────────────────────────────────────────────────────────────────────

pub fn copy_machine_catalog() -> Schema {
    Schema::new()
        .field(
            "model",
            Field::string().min_len(2, "Model must be at least 2 characters"),
        )
        .field(
            "manufacturer",
            Field::string().min_len(2, "Manufacturer must be at least 2 characters"),
        )
        .field("description", text())
        .field("file", Field::string().url("Invalid URL").optional())
        .field("price", Field::number().min(0.0, PRICE_NEGATIVE).optional())
        .field("quantity", at_least(0.0).optional())
        .field("features", Field::array(Field::string()).optional())
}

pub fn client_copy_machine() -> Schema {
    Schema::new()
        .field("client_id", Field::number().min(1.0, "Client is required"))
        .field(
            "catalog_id",
            Field::number().min(1.0, "Catalog machine is required"),
        )
        .field(
            "serial_number",
            Field::string().min_len(1, "Serial number is required"),
        )
        .field("purchase_date", text())
        .field("warranty_expiry", text())
        .field("location", text())
        .field("notes", text())
}

pub fn franchise() -> Schema {
    Schema::new()
        .field("name", name())
        .field("description", text())
        .field("price", Field::number().min(0.0, PRICE_NEGATIVE))
        .field(
            "duration",
            Field::number().min(1.0, "Duration must be at least 1 month"),
        )
        .field("features", Field::array(Field::string()).optional())
        .field("max_copies", at_least(0.0).optional())
        .field("color_copies", at_least(0.0).optional())
        .field("black_white_copies", at_least(0.0).optional())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

pub fn user() -> Schema {
    Schema::new()
        .field("name", name())
        .field("email", email())
        .field("role", Field::enumeration(USER_ROLES))
        .field("phone", phone())
        .field("position", text())
        .field("active", Field::boolean().optional())
}

pub fn create_user() -> Schema {
    user().extend(Schema::new().field("password", password()))
}

pub fn update_user() -> Schema {
    user().partial().extend(Schema::new().field("id", id()))
}

pub fn user_query() -> Schema {
    Schema::new()
        .field("search", text())
        .field("role", Field::enumeration(USER_ROLES).optional())
        .field("active", Field::boolean().optional())
        .field("page", page())
        .field("limit", limit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;
    use intersul_types::{
        ClientStatus, CreateCatalogRequest, CreateClientRequest, CreateFranchiseRequest,
        LoginRequest, RegisterRequest, ServicePriority, ServiceStatus, UserRole,
    };
    use serde_json::json;

    #[test]
    fn test_enum_values_match_wire_types() {
        for v in USER_ROLES {
            serde_json::from_value::<UserRole>(json!(v)).unwrap();
        }
        for v in CLIENT_STATUSES {
            serde_json::from_value::<ClientStatus>(json!(v)).unwrap();
        }
        for v in SERVICE_STATUSES {
            serde_json::from_value::<ServiceStatus>(json!(v)).unwrap();
        }
        for v in SERVICE_PRIORITIES {
            serde_json::from_value::<ServicePriority>(json!(v)).unwrap();
        }
    }

    #[test]
    fn test_login() {
        let request: LoginRequest =
            validate(&login(), &json!({"email": "ana@intersul.com.br", "password": "x"})).unwrap();
        assert_eq!(request.email, "ana@intersul.com.br");

        let errors = validate::<LoginRequest>(&login(), &json!({"email": "nope", "password": ""}))
            .unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_register_password_mismatch_reported_on_confirmation() {
        let errors = validate::<RegisterRequest>(
            &register(),
            &json!({
                "name": "Ana",
                "email": "ana@intersul.com.br",
                "password": "secret1",
                "confirm_password": "secret2"
            }),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("confirm_password"), Some("Passwords don't match"));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn test_register_decodes_request() {
        let request: RegisterRequest = validate(
            &register(),
            &json!({
                "name": "Ana",
                "email": "ana@intersul.com.br",
                "password": "secret1",
                "confirm_password": "secret1",
                "role": "technician",
                "phone": "(48) 99999-1234"
            }),
        )
        .unwrap();
        assert_eq!(request.role, Some(UserRole::Technician));
        assert_eq!(request.phone.as_deref(), Some("(48) 99999-1234"));
    }

    #[test]
    fn test_change_password_mismatch() {
        let errors = change_password()
            .check(&json!({
                "current_password": "old",
                "new_password": "secret1",
                "confirm_password": "secret9"
            }))
            .unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords don't match"));
    }

    #[test]
    fn test_phone_format() {
        let base = json!({"name": "Acme", "email": "acme@x.com"});
        for (phone, ok) in [
            ("(48) 3333-1234", true),
            ("(48) 99999-1234", true),
            ("48 99999-1234", false),
            ("(48)99999-1234", false),
        ] {
            let mut input = base.clone();
            input["phone"] = json!(phone);
            assert_eq!(client().check(&input).is_ok(), ok, "{}", phone);
        }
    }

    #[test]
    fn test_client_decodes() {
        let request: CreateClientRequest = validate(
            &client(),
            &json!({"name": "Acme", "email": "acme@x.com", "status": "suspended", "zip_code": "88000-000"}),
        )
        .unwrap();
        assert_eq!(request.status, Some(ClientStatus::Suspended));
        assert_eq!(request.zip_code.as_deref(), Some("88000-000"));
    }

    #[test]
    fn test_update_client_requires_only_id() {
        assert!(update_client().check(&json!({"id": 4})).is_ok());
        let errors = update_client().check(&json!({"name": "A"})).unwrap_err();
        assert_eq!(errors.get("id"), Some("Required"));
        assert_eq!(errors.get("name"), Some(NAME_TOO_SHORT));
    }

    #[test]
    fn test_service_requirements() {
        let errors = service()
            .check(&json!({"title": "X", "category_id": 0, "client_id": 0, "estimated_duration": 0}))
            .unwrap_err();
        assert_eq!(errors.get("title"), Some("Title must be at least 2 characters"));
        assert_eq!(errors.get("category_id"), Some("Category is required"));
        assert_eq!(errors.get("client_id"), Some("Client is required"));
        assert_eq!(errors.get("estimated_duration"), Some("Duration must be at least 1 minute"));
    }

    #[test]
    fn test_update_service_status() {
        assert!(update_service().check(&json!({"id": 1, "status": "on_hold"})).is_ok());
        assert!(update_service().check(&json!({"id": 1, "status": "done"})).is_err());
    }

    #[test]
    fn test_category_color() {
        assert!(service_category().check(&json!({"name": "Toner", "color": "#a1B2c3"})).is_ok());
        let errors = service_category()
            .check(&json!({"name": "Toner", "color": "red"}))
            .unwrap_err();
        assert_eq!(errors.get("color"), Some("Invalid color format"));
    }

    #[test]
    fn test_catalog() {
        let request: CreateCatalogRequest = validate(
            &copy_machine_catalog(),
            &json!({"model": "X1", "manufacturer": "Ricoh", "price": 1500.0, "features": ["duplex"]}),
        )
        .unwrap();
        assert_eq!(request.features, vec!["duplex"]);

        let errors = copy_machine_catalog()
            .check(&json!({"model": "X", "manufacturer": "Ricoh", "price": -1, "file": "nope"}))
            .unwrap_err();
        assert_eq!(errors.get("model"), Some("Model must be at least 2 characters"));
        assert_eq!(errors.get("price"), Some(PRICE_NEGATIVE));
        assert_eq!(errors.get("file"), Some("Invalid URL"));
    }

    #[test]
    fn test_client_copy_machine() {
        let errors = client_copy_machine()
            .check(&json!({"client_id": 1, "catalog_id": 0, "serial_number": ""}))
            .unwrap_err();
        assert_eq!(errors.get("catalog_id"), Some("Catalog machine is required"));
        assert_eq!(errors.get("serial_number"), Some("Serial number is required"));
    }

    #[test]
    fn test_franchise() {
        let request: CreateFranchiseRequest = validate(
            &franchise(),
            &json!({"name": "Basic", "price": 99.9, "duration": 12, "max_copies": 5000}),
        )
        .unwrap();
        assert_eq!(request.duration, 12);

        let errors = franchise()
            .check(&json!({"name": "Basic", "price": 10, "duration": 0, "color_copies": -1}))
            .unwrap_err();
        assert_eq!(errors.get("duration"), Some("Duration must be at least 1 month"));
        assert_eq!(
            errors.get("color_copies"),
            Some("Number must be greater than or equal to 0")
        );
    }

    #[test]
    fn test_user_schemas() {
        let errors = user()
            .check(&json!({"name": "Ana", "email": "ana@x.com"}))
            .unwrap_err();
        assert_eq!(errors.get("role"), Some("Required"));

        let errors = create_user()
            .check(&json!({"name": "Ana", "email": "ana@x.com", "role": "admin", "password": "123"}))
            .unwrap_err();
        assert_eq!(errors.get("password"), Some("Password must be at least 6 characters"));

        assert!(update_user().check(&json!({"id": 2, "active": false})).is_ok());

        let errors = user_query().check(&json!({"role": "owner"})).unwrap_err();
        assert_eq!(
            errors.get("role"),
            Some("Invalid enum value. Expected 'admin' | 'manager' | 'technician' | 'commercial', received 'owner'")
        );
    }

    #[test]
    fn test_query_bounds() {
        assert!(client_query().check(&json!({"page": 1, "limit": 100})).is_ok());

        let errors = client_query()
            .check(&json!({"page": 0, "limit": 101}))
            .unwrap_err();
        assert_eq!(errors.get("page"), Some("Number must be greater than or equal to 1"));
        assert_eq!(errors.get("limit"), Some("Number must be less than or equal to 100"));

        assert!(service_query().check(&json!({"priority": "urgent", "page": 2})).is_ok());
    }
}
