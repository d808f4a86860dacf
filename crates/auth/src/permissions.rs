//! Permission and module vocabularies, plus the default grant tables.
//!
//! The grant tables are deliberately plain lookup tables — the per-tier
//! lists are contractual, not derived. Changing what a tier grants means
//! editing the table, nothing else.

use serde::{Deserialize, Serialize};

use salespoint_core::DomainError;

use crate::roles::{AccessLevel, AdminLevel, EmployeeRole, impl_str_enum};

/// A capability flag checked independently of role.
///
/// The vocabulary is closed: serde (and `FromStr`) reject anything outside
/// it, so an invalid capability can never reach a stored permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // System management
    ManageSystemSettings,
    ManageDatabase,
    ManageBackups,
    ManageSecurity,
    ViewSystemLogs,
    ManageApiKeys,

    // User management
    ManageAllUsers,
    ManageEmployees,
    ManageClients,
    ManageAdmins,
    ViewUserLogs,
    ResetUserPasswords,
    SuspendUsers,
    DeleteUsers,

    // Business management
    ManageBusinessSettings,
    ManageCompanyInfo,
    ManageBilling,
    ManageSubscriptions,
    ViewFinancialReports,
    ManageTaxSettings,

    // Content management
    ManageContent,
    ManageTemplates,
    ManageNotifications,
    ManageAnnouncements,
    ManageHelpDocs,

    // Analytics
    ViewAdvancedAnalytics,
    ExportData,
    GenerateReports,
    ViewAuditLogs,
    ManageDashboards,

    // Day-to-day operations (the employee vocabulary)
    ViewDashboard,
    ManageCustomers,
    ManageProducts,
    ManageSales,
    ManageInventory,
    ManageReports,
    ManageSettings,
    ViewReports,
    CreateSales,
    EditSales,
    DeleteSales,
    ViewCustomers,
    CreateCustomers,
    EditCustomers,
    DeleteCustomers,
    ViewProducts,
    CreateProducts,
    EditProducts,
    DeleteProducts,
}

impl_str_enum!(Permission, "permission", {
    ManageSystemSettings => "manage_system_settings",
    ManageDatabase => "manage_database",
    ManageBackups => "manage_backups",
    ManageSecurity => "manage_security",
    ViewSystemLogs => "view_system_logs",
    ManageApiKeys => "manage_api_keys",
    ManageAllUsers => "manage_all_users",
    ManageEmployees => "manage_employees",
    ManageClients => "manage_clients",
    ManageAdmins => "manage_admins",
    ViewUserLogs => "view_user_logs",
    ResetUserPasswords => "reset_user_passwords",
    SuspendUsers => "suspend_users",
    DeleteUsers => "delete_users",
    ManageBusinessSettings => "manage_business_settings",
    ManageCompanyInfo => "manage_company_info",
    ManageBilling => "manage_billing",
    ManageSubscriptions => "manage_subscriptions",
    ViewFinancialReports => "view_financial_reports",
    ManageTaxSettings => "manage_tax_settings",
    ManageContent => "manage_content",
    ManageTemplates => "manage_templates",
    ManageNotifications => "manage_notifications",
    ManageAnnouncements => "manage_announcements",
    ManageHelpDocs => "manage_help_docs",
    ViewAdvancedAnalytics => "view_advanced_analytics",
    ExportData => "export_data",
    GenerateReports => "generate_reports",
    ViewAuditLogs => "view_audit_logs",
    ManageDashboards => "manage_dashboards",
    ViewDashboard => "view_dashboard",
    ManageCustomers => "manage_customers",
    ManageProducts => "manage_products",
    ManageSales => "manage_sales",
    ManageInventory => "manage_inventory",
    ManageReports => "manage_reports",
    ManageSettings => "manage_settings",
    ViewReports => "view_reports",
    CreateSales => "create_sales",
    EditSales => "edit_sales",
    DeleteSales => "delete_sales",
    ViewCustomers => "view_customers",
    CreateCustomers => "create_customers",
    EditCustomers => "edit_customers",
    DeleteCustomers => "delete_customers",
    ViewProducts => "view_products",
    CreateProducts => "create_products",
    EditProducts => "edit_products",
    DeleteProducts => "delete_products",
});

/// A named application area an admin may or may not reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Dashboard,
    Customers,
    Products,
    Sales,
    Inventory,
    Employees,
    Reports,
    Settings,
    Analytics,
    AdminPanel,
    SystemSettings,
    UserManagement,
    Billing,
    ContentManagement,
}

impl_str_enum!(Module, "module", {
    Dashboard => "dashboard",
    Customers => "customers",
    Products => "products",
    Sales => "sales",
    Inventory => "inventory",
    Employees => "employees",
    Reports => "reports",
    Settings => "settings",
    Analytics => "analytics",
    AdminPanel => "admin_panel",
    SystemSettings => "system_settings",
    UserManagement => "user_management",
    Billing => "billing",
    ContentManagement => "content_management",
});

impl Permission {
    /// The subset of the vocabulary an employee record may hold.
    pub const EMPLOYEE_VOCABULARY: &'static [Permission] = &[
        Permission::ViewDashboard,
        Permission::ManageCustomers,
        Permission::ManageProducts,
        Permission::ManageSales,
        Permission::ManageInventory,
        Permission::ManageReports,
        Permission::ManageEmployees,
        Permission::ManageSettings,
        Permission::ViewReports,
        Permission::CreateSales,
        Permission::EditSales,
        Permission::DeleteSales,
        Permission::ViewCustomers,
        Permission::CreateCustomers,
        Permission::EditCustomers,
        Permission::DeleteCustomers,
        Permission::ViewProducts,
        Permission::CreateProducts,
        Permission::EditProducts,
        Permission::DeleteProducts,
    ];

    pub fn allowed_for_employee(self) -> bool {
        Self::EMPLOYEE_VOCABULARY.contains(&self)
    }
}

/// Reject any permission an employee record is not allowed to carry.
pub fn validate_employee_permissions(permissions: &[Permission]) -> Result<(), DomainError> {
    for permission in permissions {
        if !permission.allowed_for_employee() {
            return Err(DomainError::validation(format!(
                "permission '{}' is not valid for employees",
                permission.as_str()
            )));
        }
    }
    Ok(())
}

impl EmployeeRole {
    /// Default permission grant for an employee role tier.
    pub const fn default_permissions(self) -> &'static [Permission] {
        match self {
            EmployeeRole::Employee => &[
                Permission::ViewDashboard,
                Permission::ViewCustomers,
                Permission::ViewProducts,
                Permission::CreateSales,
                Permission::ViewReports,
            ],
            EmployeeRole::Supervisor => &[
                Permission::ViewDashboard,
                Permission::ManageCustomers,
                Permission::ViewProducts,
                Permission::ManageSales,
                Permission::ViewReports,
                Permission::EditSales,
                Permission::CreateCustomers,
                Permission::EditCustomers,
            ],
            EmployeeRole::Manager => &[
                Permission::ViewDashboard,
                Permission::ManageCustomers,
                Permission::ManageProducts,
                Permission::ManageSales,
                Permission::ManageInventory,
                Permission::ViewReports,
                Permission::CreateSales,
                Permission::EditSales,
                Permission::DeleteSales,
                Permission::CreateCustomers,
                Permission::EditCustomers,
                Permission::DeleteCustomers,
                Permission::CreateProducts,
                Permission::EditProducts,
                Permission::DeleteProducts,
            ],
            EmployeeRole::Admin => &[
                Permission::ViewDashboard,
                Permission::ManageCustomers,
                Permission::ManageProducts,
                Permission::ManageSales,
                Permission::ManageInventory,
                Permission::ManageReports,
                Permission::ManageEmployees,
                Permission::ManageSettings,
                Permission::ViewReports,
                Permission::CreateSales,
                Permission::EditSales,
                Permission::DeleteSales,
                Permission::CreateCustomers,
                Permission::EditCustomers,
                Permission::DeleteCustomers,
                Permission::CreateProducts,
                Permission::EditProducts,
                Permission::DeleteProducts,
            ],
        }
    }
}

impl AdminLevel {
    /// Default permission grant for an admin capability tier.
    ///
    /// Tiers nest: manager ⊂ admin ⊂ super_admin.
    pub const fn default_permissions(self) -> &'static [Permission] {
        match self {
            AdminLevel::Manager => &[
                Permission::ViewDashboard,
                Permission::ManageCustomers,
                Permission::ManageProducts,
                Permission::ManageSales,
                Permission::ManageInventory,
                Permission::ViewReports,
                Permission::CreateSales,
                Permission::EditSales,
                Permission::DeleteSales,
                Permission::CreateCustomers,
                Permission::EditCustomers,
                Permission::DeleteCustomers,
                Permission::CreateProducts,
                Permission::EditProducts,
                Permission::DeleteProducts,
                Permission::ManageEmployees,
                Permission::ViewAdvancedAnalytics,
                Permission::ExportData,
                Permission::GenerateReports,
            ],
            AdminLevel::Admin => &[
                Permission::ViewDashboard,
                Permission::ManageCustomers,
                Permission::ManageProducts,
                Permission::ManageSales,
                Permission::ManageInventory,
                Permission::ManageReports,
                Permission::ManageEmployees,
                Permission::ManageSettings,
                Permission::ViewReports,
                Permission::CreateSales,
                Permission::EditSales,
                Permission::DeleteSales,
                Permission::CreateCustomers,
                Permission::EditCustomers,
                Permission::DeleteCustomers,
                Permission::CreateProducts,
                Permission::EditProducts,
                Permission::DeleteProducts,
                Permission::ViewAdvancedAnalytics,
                Permission::ExportData,
                Permission::GenerateReports,
                Permission::ManageBusinessSettings,
                Permission::ManageCompanyInfo,
                Permission::ViewFinancialReports,
                Permission::ManageContent,
                Permission::ManageNotifications,
                Permission::ManageAnnouncements,
            ],
            AdminLevel::SuperAdmin => &[
                Permission::ViewDashboard,
                Permission::ManageCustomers,
                Permission::ManageProducts,
                Permission::ManageSales,
                Permission::ManageInventory,
                Permission::ManageReports,
                Permission::ManageEmployees,
                Permission::ManageSettings,
                Permission::ViewReports,
                Permission::CreateSales,
                Permission::EditSales,
                Permission::DeleteSales,
                Permission::CreateCustomers,
                Permission::EditCustomers,
                Permission::DeleteCustomers,
                Permission::CreateProducts,
                Permission::EditProducts,
                Permission::DeleteProducts,
                Permission::ViewAdvancedAnalytics,
                Permission::ExportData,
                Permission::GenerateReports,
                Permission::ViewAuditLogs,
                Permission::ManageDashboards,
                Permission::ManageBusinessSettings,
                Permission::ManageCompanyInfo,
                Permission::ViewFinancialReports,
                Permission::ManageContent,
                Permission::ManageNotifications,
                Permission::ManageAnnouncements,
                Permission::ManageSystemSettings,
                Permission::ManageDatabase,
                Permission::ManageBackups,
                Permission::ManageSecurity,
                Permission::ViewSystemLogs,
                Permission::ManageApiKeys,
                Permission::ManageAllUsers,
                Permission::ManageClients,
                Permission::ManageAdmins,
                Permission::ViewUserLogs,
                Permission::ResetUserPasswords,
                Permission::SuspendUsers,
                Permission::DeleteUsers,
                Permission::ManageBilling,
                Permission::ManageSubscriptions,
                Permission::ManageTaxSettings,
                Permission::ManageTemplates,
                Permission::ManageHelpDocs,
            ],
        }
    }
}

impl AccessLevel {
    /// Default module grant for an access level.
    ///
    /// Levels nest: read_only ⊂ limited_access ⊂ full_access.
    pub const fn default_modules(self) -> &'static [Module] {
        match self {
            AccessLevel::ReadOnly => &[
                Module::Dashboard,
                Module::Customers,
                Module::Products,
                Module::Sales,
                Module::Inventory,
                Module::Reports,
            ],
            AccessLevel::LimitedAccess => &[
                Module::Dashboard,
                Module::Customers,
                Module::Products,
                Module::Sales,
                Module::Inventory,
                Module::Employees,
                Module::Reports,
                Module::Settings,
                Module::Analytics,
            ],
            AccessLevel::FullAccess => &[
                Module::Dashboard,
                Module::Customers,
                Module::Products,
                Module::Sales,
                Module::Inventory,
                Module::Employees,
                Module::Reports,
                Module::Settings,
                Module::Analytics,
                Module::AdminPanel,
                Module::SystemSettings,
                Module::UserManagement,
                Module::Billing,
                Module::ContentManagement,
            ],
        }
    }
}
