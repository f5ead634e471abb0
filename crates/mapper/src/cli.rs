//! Clap derive structures for the `mapper` CLI.
//!
//! Defines the complete command tree, global flags, and shared types. One
//! subcommand tree per console page.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mapper -- console for the Mapper network automation studio
#[derive(Debug, Parser)]
#[command(
    name = "mapper",
    version,
    about = "Manage devices, YANG models, API schemas, mappings, templates and services",
    long_about = "Command-line console for Mapper Design Studio.\n\n\
        Sign in once with `mapper login`; the session is kept in the\n\
        profile's storage file until `mapper logout` or the backend rejects it.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "MAPPER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// REST API base URL (overrides profile)
    #[arg(long, env = "MAPPER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Notification socket base URL (overrides profile)
    #[arg(long, env = "MAPPER_WS_URL", global = true)]
    pub ws_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MAPPER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MAPPER_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MAPPER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and start a session
    Login(LoginArgs),

    /// Create an account (does not sign in)
    Register(RegisterArgs),

    /// End the current session
    Logout,

    /// Exchange the refresh token for a new token pair
    Refresh,

    /// Change, reset or recover a password; verify an email address
    Password(PasswordArgs),

    /// Show or update the signed-in user's profile
    Profile(ProfileArgs),

    /// Overview of devices, models, services and unread notifications
    #[command(alias = "home")]
    Dashboard,

    /// Manage network devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage YANG data models
    #[command(alias = "yang", alias = "y")]
    YangModels(YangModelsArgs),

    /// Manage API schemas
    #[command(alias = "schemas")]
    ApiSchemas(ApiSchemasArgs),

    /// Manage YANG-to-API mappings
    #[command(alias = "map")]
    Mappings(MappingsArgs),

    /// Manage configuration templates
    #[command(alias = "tpl")]
    Templates(TemplatesArgs),

    /// Manage and deploy services
    #[command(alias = "svc")]
    Services(ServicesArgs),

    /// Read, manage and watch notifications
    #[command(alias = "notif")]
    Notifications(NotificationsArgs),

    /// Console preferences (sidebar, theme)
    Ui(UiArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Shared pagination and search arguments for all list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: u32,

    /// Free-text search
    #[arg(long, short = 's', default_value = "")]
    pub search: String,
}

/// A JSON request body read from disk.
#[derive(Debug, Args)]
pub struct FromFile {
    /// JSON file with the request body
    #[arg(long, short = 'F')]
    pub from_file: PathBuf,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's username, then prompts)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Prompt for the password even if one is configured
    #[arg(long)]
    pub ask_password: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, short = 'u')]
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, value_enum)]
    pub role: RoleArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    NetworkEngineer,
    ServiceDesigner,
    Operator,
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[command(subcommand)]
    pub command: PasswordCommand,
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Change the signed-in user's password (prompts for both)
    Change,

    /// Request a password reset email
    Forgot { email: String },

    /// Set a new password using a reset token
    Reset { token: String },

    /// Confirm an email address with a verification token
    VerifyEmail { token: String },
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: Option<ProfileCommand>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the signed-in user
    Show,

    /// Update name or email
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Check whether the signed-in user holds a role or permission
    Can {
        /// Role names (any match passes)
        #[arg(long, value_enum, num_args = 1..)]
        role: Vec<RoleArg>,
        /// Permission name
        #[arg(long)]
        permission: Option<String>,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Netconf,
    Cli,
    Restconf,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one device
    Get { device: String },

    /// Create a device from a JSON file
    Create(FromFile),

    /// Update a device from a JSON file
    Update {
        device: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete { device: String },

    /// Test connectivity without connecting
    Test { device: String },

    /// Open a management session to the device
    Connect { device: String },

    /// Close the management session
    Disconnect { device: String },

    /// Current connection status
    Status { device: String },

    /// Connect several devices at once
    BulkConnect {
        #[arg(required = true)]
        devices: Vec<String>,
    },

    /// Disconnect several devices at once
    BulkDisconnect {
        #[arg(required = true)]
        devices: Vec<String>,
    },

    /// Capabilities advertised by the device
    Capabilities { device: String },

    /// YANG models associated with the device
    Models {
        device: String,
        /// Ask the device for its models instead of reading the stored list
        #[arg(long)]
        fetch: bool,
    },

    /// Replace the device's login credentials (prompts for the password)
    SetCredentials {
        device: String,
        #[arg(long, short = 'u')]
        username: String,
    },

    /// Devices from one vendor
    Vendor { vendor: String },

    /// Devices using one management protocol
    Protocol {
        #[arg(value_enum)]
        protocol: ProtocolArg,
    },

    /// Devices currently connected
    Connected,

    /// Export devices to a file
    Export {
        /// Devices to export (all when omitted)
        devices: Vec<String>,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },

    /// Import devices from a file
    Import { file: PathBuf },
}

// ── YANG models ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct YangModelsArgs {
    #[command(subcommand)]
    pub command: YangModelsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum YangFormatArg {
    Yang,
    Json,
    Xml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DocFormatArg {
    Html,
    Pdf,
    Markdown,
}

#[derive(Debug, Subcommand)]
pub enum YangModelsCommand {
    /// List YANG models
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one model
    Get { model: String },

    /// Create a model record from a JSON file
    Create(FromFile),

    /// Update a model from a JSON file
    Update {
        model: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete a model
    #[command(alias = "rm")]
    Delete { model: String },

    /// Upload one .yang file
    Upload { file: PathBuf },

    /// Import several .yang files in one request
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Parse YANG source without storing it
    Parse { file: PathBuf },

    /// Re-validate a stored model
    Validate { model: String },

    /// Compare two stored models
    Compare { model1: String, model2: String },

    /// Models this model depends on
    Deps { model: String },

    /// Models declaring a namespace
    Namespace { namespace: String },

    /// Models attached to a device
    ByDevice { device: String },

    /// Search models
    #[command(disable_version_flag = true)]
    Search {
        query: String,
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        device: Option<String>,
    },

    /// Schema tree of a model
    Tree { model: String },

    /// JSON schema derived from a model
    Schema { model: String },

    /// Revision history
    History { model: String },

    /// Download generated documentation
    Docs {
        model: String,
        #[arg(long, value_enum, default_value = "markdown")]
        format: DocFormatArg,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },

    /// Export a model
    Export {
        model: String,
        #[arg(long, value_enum, default_value = "yang")]
        format: YangFormatArg,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },
}

// ── API schemas ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApiSchemasArgs {
    #[command(subcommand)]
    pub command: ApiSchemasCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaFormatArg {
    Json,
    Yaml,
    Openapi,
}

#[derive(Debug, Subcommand)]
pub enum ApiSchemasCommand {
    /// List API schemas
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one schema
    Get { schema: String },

    /// Create a schema from a JSON file
    Create(FromFile),

    /// Update a schema from a JSON file
    Update {
        schema: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete a schema
    #[command(alias = "rm")]
    Delete { schema: String },

    /// Validate a schema
    Validate { schema: String },

    /// Publish a schema
    Publish { schema: String },

    /// Withdraw a published schema
    Unpublish { schema: String },

    /// Version history
    Versions { schema: String },

    /// Generated OpenAPI document
    Openapi { schema: String },

    /// Copy a schema under a new name
    Clone { schema: String, name: String },

    /// Export a schema
    Export {
        schema: String,
        #[arg(long, value_enum, default_value = "json")]
        format: SchemaFormatArg,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },

    /// Import a schema file
    Import { file: PathBuf },
}

// ── Mappings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub command: MappingsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MappingFormatArg {
    Json,
    Yaml,
}

#[derive(Debug, Subcommand)]
pub enum MappingsCommand {
    /// List mappings
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one mapping
    Get { mapping: String },

    /// Create a mapping from a JSON file
    Create(FromFile),

    /// Update a mapping from a JSON file
    Update {
        mapping: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete a mapping
    #[command(alias = "rm")]
    Delete { mapping: String },

    /// Run a mapping against sample data from a JSON file
    Test {
        mapping: String,
        #[command(flatten)]
        data: FromFile,
    },

    /// Validate a mapping
    Validate { mapping: String },

    /// Have the backend propose a mapping
    Generate {
        /// YANG model id
        source: String,
        /// API schema id
        target: String,
    },

    /// Manage mapping rules
    Rules(MappingChildArgs),

    /// Manage transformations
    Transformations(MappingChildArgs),

    /// Export a mapping
    Export {
        mapping: String,
        #[arg(long, value_enum, default_value = "json")]
        format: MappingFormatArg,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },

    /// Import a mapping file
    Import { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct MappingChildArgs {
    pub mapping: String,

    #[command(subcommand)]
    pub command: ChildCommand,
}

/// CRUD over a mapping's rules or transformations, or a template's test cases.
#[derive(Debug, Subcommand)]
pub enum ChildCommand {
    /// List entries
    #[command(alias = "ls")]
    List,

    /// Add an entry from a JSON file
    Add(FromFile),

    /// Update an entry from a JSON file
    Update {
        id: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete { id: String },
}

// ── Templates ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List templates
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one template
    Get { template: String },

    /// Create a template from a JSON file
    Create(FromFile),

    /// Update a template from a JSON file
    Update {
        template: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete a template
    #[command(alias = "rm")]
    Delete { template: String },

    /// Render with variables from a JSON object file
    Render {
        template: String,
        #[command(flatten)]
        vars: FromFile,
    },

    /// Validate a template
    Validate { template: String },

    /// Run one test case, or all of them
    Test {
        template: String,
        /// Test case id (all cases when omitted)
        #[arg(long)]
        case: Option<String>,
    },

    /// Templates for one vendor
    Vendor { vendor: String },

    /// Templates for one device type
    DeviceType { device_type: String },

    /// Show declared variables
    Variables { template: String },

    /// Replace declared variables from a JSON array file
    SetVariables {
        template: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Manage test cases
    Cases {
        template: String,
        #[command(subcommand)]
        command: ChildCommand,
    },

    /// Copy a template under a new name
    Clone { template: String, name: String },

    /// Export a template
    Export {
        template: String,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },

    /// Import a template file
    Import { file: PathBuf },
}

// ── Services ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List services
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one service
    Get { service: String },

    /// Create a service from a JSON file
    Create(FromFile),

    /// Update a service from a JSON file
    Update {
        service: String,
        #[command(flatten)]
        body: FromFile,
    },

    /// Delete a service
    #[command(alias = "rm")]
    Delete { service: String },

    /// Deploy a service
    Deploy { service: String },

    /// Remove a deployed service
    Undeploy { service: String },

    /// Restart a deployed service
    Restart { service: String },

    /// Roll back to an earlier deployment
    Rollback { service: String, deployment: String },

    /// Preview the commands a deployment would push
    Preview { service: String },

    /// Deployment history
    Deployments { service: String },

    /// Deployment and health status
    Status { service: String },

    /// Runtime metrics
    Metrics {
        service: String,
        /// Time range understood by the backend (e.g. 1h, 24h)
        #[arg(long)]
        range: Option<String>,
    },

    /// Recent log entries
    Logs {
        service: String,
        #[arg(long, default_value = "100")]
        limit: u32,
        #[arg(long)]
        level: Option<String>,
    },

    /// Validate a service configuration from a JSON file
    ValidateConfig(FromFile),

    /// Copy a service under a new name
    Clone { service: String, name: String },

    /// Export a service
    Export {
        service: String,
        #[arg(long, short = 'O')]
        out: PathBuf,
    },

    /// Import a service file
    Import { file: PathBuf },
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NotificationTypeArg {
    Info,
    Success,
    Warning,
    Error,
    System,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List notifications
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, short = 'l', default_value = "20")]
        limit: u32,
        #[arg(long = "type", value_enum)]
        kind: Option<NotificationTypeArg>,
        #[arg(long, value_enum)]
        severity: Option<SeverityArg>,
        /// Only unread notifications
        #[arg(long, conflicts_with = "read")]
        unread: bool,
        /// Only read notifications
        #[arg(long)]
        read: bool,
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one notification
    Get { notification: String },

    /// Create a notification from a JSON file
    Create(FromFile),

    /// Delete a notification
    #[command(alias = "rm")]
    Delete { notification: String },

    /// Mark as read
    Read { notification: String },

    /// Mark as unread
    Unread { notification: String },

    /// Mark every notification as read
    ReadAll,

    /// Delete every read notification
    ClearRead,

    /// Number of unread notifications
    Count,

    /// Show delivery settings
    Settings,

    /// Replace delivery settings from a JSON file
    SetSettings(FromFile),

    /// Run an action attached to a notification
    Action { notification: String, action: String },

    /// Stream live notifications until interrupted
    ///
    /// Set `reconnect = true` on the profile to survive socket drops.
    Watch,
}

// ── UI preferences ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UiArgs {
    #[command(subcommand)]
    pub command: UiCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SidebarArg {
    Toggle,
    Collapse,
    Expand,
}

#[derive(Debug, Subcommand)]
pub enum UiCommand {
    /// Show stored preferences
    Show,

    /// Set the color theme
    Theme {
        #[arg(value_enum)]
        theme: ThemeArg,
    },

    /// Collapse, expand or toggle the sidebar
    Sidebar {
        #[arg(value_enum)]
        state: SidebarArg,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// List profile names
    Profiles,

    /// Set the default profile
    Use { name: String },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
