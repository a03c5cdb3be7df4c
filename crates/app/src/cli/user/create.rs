use clap::Args;
use huerto_app::{
    database::{self, Db, PoolSettings},
    domain::users::{
        PgUsersService, UsersService,
        data::NewUser,
        records::{UserRole, UserUuid},
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Unique email address
    #[arg(long)]
    email: String,

    /// `producer` or `consumer`
    #[arg(long)]
    role: UserRole,

    /// Where a producer farms; shown next to their products
    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image_url: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url, PoolSettings::default())
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgUsersService::new(Db::new(pool));
    let uuid = args
        .user_uuid
        .map_or_else(UserUuid::new, UserUuid::from_uuid);

    let user = service
        .create_user(NewUser {
            uuid,
            name: args.name,
            email: args.email,
            role: args.role,
            location: args.location,
            description: args.description,
            image_url: args.image_url,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_name: {}", user.name);
    println!("user_role: {}", user.role);

    Ok(())
}
