//! Permission management for the platform.
//!
//! The data model mirrors what the admin service stores; the client is
//! plain request/response glue. Widget/UI concerns live with the caller.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::transport::{AdminTransport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    AccessDocuments,
    EditDocuments,
    ManageConnections,
    ManagePeers,
    ManagePermissions,
    ViewAuditLog,
    PlatformAdmin,
}

impl Permission {
    pub fn as_int(self) -> i32 {
        match self {
            Permission::AccessDocuments => 1,
            Permission::EditDocuments => 2,
            Permission::ManageConnections => 3,
            Permission::ManagePeers => 4,
            Permission::ManagePermissions => 5,
            Permission::ViewAuditLog => 6,
            Permission::PlatformAdmin => 7,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(Permission::AccessDocuments),
            2 => Some(Permission::EditDocuments),
            3 => Some(Permission::ManageConnections),
            4 => Some(Permission::ManagePeers),
            5 => Some(Permission::ManagePermissions),
            6 => Some(Permission::ViewAuditLog),
            7 => Some(Permission::PlatformAdmin),
            _ => None,
        }
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::AccessDocuments,
    Permission::EditDocuments,
    Permission::ManageConnections,
    Permission::ManagePeers,
    Permission::ManagePermissions,
    Permission::ViewAuditLog,
    Permission::PlatformAdmin,
];
const MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::AccessDocuments,
    Permission::EditDocuments,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Member => MEMBER_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Member => "Member",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

/// One permission held by a subject (user or service account).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub subject: String,
    pub permission: Permission,
    /// Unix timestamp (seconds) of when the grant was recorded.
    pub granted_at: i64,
    /// Unix timestamp (seconds) after which the grant no longer applies.
    pub expires_at: Option<i64>,
}

impl PermissionGrant {
    /// Builds a grant stamped with the current time.
    pub fn new(subject: impl Into<String>, permission: Permission) -> Self {
        Self {
            subject: subject.into(),
            permission,
            granted_at: unix_now(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the grant applies at the given time.
    pub fn is_active_at(&self, timestamp: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => timestamp < expires_at,
            None => true,
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Typed client for the permission-management service.
pub struct PermissionsClient {
    transport: Arc<dyn AdminTransport>,
}

impl PermissionsClient {
    pub fn new(transport: Arc<dyn AdminTransport>) -> Self {
        Self { transport }
    }

    /// Returns all grants held by a subject.
    pub async fn list_grants(
        &self,
        subject: &str,
    ) -> Result<Vec<PermissionGrant>, TransportError> {
        self.transport.list_permission_grants(subject).await
    }

    /// Grants a permission to a subject, without expiry.
    pub async fn grant(
        &self,
        subject: &str,
        permission: Permission,
    ) -> Result<PermissionGrant, TransportError> {
        let grant = PermissionGrant::new(subject, permission);
        debug!(subject, permission = grant.permission.as_int(), "granting permission");
        self.transport.grant_permission(grant.clone()).await?;
        Ok(grant)
    }

    /// Grants a permission that expires at the given unix timestamp.
    pub async fn grant_until(
        &self,
        subject: &str,
        permission: Permission,
        expires_at: i64,
    ) -> Result<PermissionGrant, TransportError> {
        let grant = PermissionGrant::new(subject, permission).with_expiry(expires_at);
        self.transport.grant_permission(grant.clone()).await?;
        Ok(grant)
    }

    /// Revokes a permission from a subject.
    pub async fn revoke(
        &self,
        subject: &str,
        permission: Permission,
    ) -> Result<(), TransportError> {
        debug!(subject, permission = permission.as_int(), "revoking permission");
        self.transport.revoke_permission(subject, permission).await
    }

    /// Grants every permission of a role to a subject.
    pub async fn grant_role(
        &self,
        subject: &str,
        role: Role,
    ) -> Result<Vec<PermissionGrant>, TransportError> {
        let mut grants = Vec::with_capacity(role.permissions().len());
        for permission in role.permissions() {
            grants.push(self.grant(subject, *permission).await?);
        }
        Ok(grants)
    }
}
