//! Shared domain types for the Intersul field-service console.
//!
//! These types mirror the remote API contract. Field names follow the API's
//! snake_case convention, so the `serde` derives double as the key mapping
//! between the console and the wire: no runtime key rewriting is needed for
//! any typed body.

pub mod auth;
pub mod client;
pub mod common;
pub mod copy_machine;
pub mod dashboard;
pub mod service;

pub use auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, User,
    UserPatch, UserQuery, UserRole, UserStats,
};
pub use client::{
    Client, ClientQuery, ClientStats, ClientStatus, CreateClientRequest, UpdateClientRequest,
};
pub use common::{Entity, EntityId, MessageResponse, Paginated};
pub use copy_machine::{
    ClientCopyMachine, ClientCopyMachineStatus, CopyMachineCatalog, CopyMachineStats,
    CreateCatalogRequest, CreateClientCopyMachineRequest, CreateFranchiseRequest, Franchise,
    UpdateCatalogRequest, UpdateClientCopyMachineRequest, UpdateFranchiseRequest,
};
pub use dashboard::DashboardStats;
pub use service::{
    Category, CreateCategoryRequest, CreateServiceCategoryRequest, CreateServiceRequest,
    CreateStepRequest, Service, ServiceCategory, ServicePriority, ServiceQuery, ServiceStats,
    ServiceStatus, ServiceStep, ServiceStepStatus, StepDraft, StepTemplate, StepTemplateDraft,
    UpdateCategoryRequest, UpdateServiceRequest, UpdateStepRequest,
};
