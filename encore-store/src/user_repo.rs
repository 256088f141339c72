use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use encore_core::repository::UserRepository;
use encore_core::search::{UserSearch, RESULT_LIMIT};
use encore_core::RepoResult;
use encore_shared::{AccountType, GeoPoint, Link, Profile, User};

use crate::sql::{location, push_any_term, push_any_typology, push_distance, push_within_radius};

const USER_COLUMNS: &str = "id, email, password_hash, account_type, facebook, google, fullname, description, \
     picture, address, lng, lat, typologies, links, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    account_type: Option<String>,
    facebook: Option<String>,
    google: Option<String>,
    fullname: String,
    description: Option<String>,
    picture: Option<String>,
    address: String,
    lng: f64,
    lat: f64,
    typologies: Vec<String>,
    links: Json<Vec<Link>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            account_type: row.account_type.and_then(|t| t.parse().ok()),
            facebook: row.facebook,
            google: row.google,
            profile: Profile {
                fullname: row.fullname,
                description: row.description,
                location: location(row.address, row.lng, row.lat),
                picture: row.picture,
                typologies: row.typologies,
                links: row.links.0,
            },
            created_at: row.created_at,
        }
    }
}

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, mut qb: QueryBuilder<'_, Postgres>) -> RepoResult<Vec<User>> {
        let rows: Vec<UserRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert_user(&self, user: &User) -> RepoResult<()> {
        let p = &user.profile;
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, account_type, facebook, google, fullname, description,
                               picture, address, lng, lat, typologies, links, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(user.password_hash.as_deref())
        .bind(user.account_type.map(|t| t.as_str()))
        .bind(user.facebook.as_deref())
        .bind(user.google.as_deref())
        .bind(&p.fullname)
        .bind(p.description.as_deref())
        .bind(p.picture.as_deref())
        .bind(&p.location.address)
        .bind(p.location.coordinates.lng())
        .bind(p.location.coordinates.lat())
        .bind(&p.typologies)
        .bind(Json(&p.links))
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_users(&self, ids: &[Uuid]) -> RepoResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn list_users_by_type(&self, account_type: AccountType) -> RepoResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE account_type = $1 ORDER BY created_at",
            USER_COLUMNS
        ))
        .bind(account_type.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_profile(&self, id: Uuid, account_type: AccountType, profile: &Profile) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET account_type = $2, fullname = $3, description = $4, picture = $5, address = $6,
                lng = $7, lat = $8, typologies = $9, links = $10
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(account_type.as_str())
        .bind(&profile.fullname)
        .bind(profile.description.as_deref())
        .bind(profile.picture.as_deref())
        .bind(&profile.location.address)
        .bind(profile.location.coordinates.lng())
        .bind(profile.location.coordinates.lat())
        .bind(&profile.typologies)
        .bind(Json(&profile.links))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn update_credentials(&self, id: Uuid, email: &str, password_hash: Option<&str>) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET email = $2, password_hash = COALESCE($3, password_hash) WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_users(&self, search: &UserSearch) -> RepoResult<Vec<User>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM users WHERE account_type = ", USER_COLUMNS));
        qb.push_bind(search.account_type.as_str());
        push_any_term(&mut qb, &["fullname"], &search.terms);
        if let Some(point) = search.near {
            push_within_radius(&mut qb, "lng", "lat", point);
        }
        push_any_typology(&mut qb, &search.typologies);
        qb.push(" ORDER BY created_at LIMIT ").push_bind(search.limit as i64);
        self.fetch(qb).await
    }

    async fn nearest_users(&self, account_type: AccountType, point: GeoPoint) -> RepoResult<Vec<User>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM users WHERE account_type = ", USER_COLUMNS));
        qb.push_bind(account_type.as_str());
        push_within_radius(&mut qb, "lng", "lat", point);
        qb.push(" ORDER BY ");
        push_distance(&mut qb, "lng", "lat", point);
        qb.push(" LIMIT ").push_bind(RESULT_LIMIT as i64);
        self.fetch(qb).await
    }
}
