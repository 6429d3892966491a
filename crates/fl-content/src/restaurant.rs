use super::*;
use fl_auth::allocator;
use fl_auth::allocator::Charset;
use fl_core::ID;
use fl_core::Unique;
use std::time::SystemTime;

/// Launch market; every restaurant is deduplicated within it.
pub const CITY: &str = "Delhi";

/// Deduplicated restaurant, identified publicly by an allocator-derived
/// slug (`karims-old-delhi`, `karims-old-delhi-1`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restaurant {
    id: ID<Self>,
    name: String,
    slug: String,
    area: String,
    city: String,
    maps_url: Option<String>,
    created_at: SystemTime,
}

impl Restaurant {
    pub fn new(
        name: String,
        slug: String,
        area: String,
        city: String,
        maps_url: Option<String>,
    ) -> Self {
        Self {
            id: ID::default(),
            name,
            slug,
            area,
            city,
            maps_url,
            created_at: SystemTime::now(),
        }
    }
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ID<Self>,
        name: String,
        slug: String,
        area: String,
        city: String,
        maps_url: Option<String>,
        created_at: SystemTime,
    ) -> Self {
        Self {
            id,
            name,
            slug,
            area,
            city,
            maps_url,
            created_at,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn slug(&self) -> &str {
        &self.slug
    }
    pub fn area(&self) -> &str {
        &self.area
    }
    pub fn city(&self) -> &str {
        &self.city
    }
    pub fn maps_url(&self) -> Option<&str> {
        self.maps_url.as_deref()
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

impl Unique for Restaurant {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Persistence interface for restaurant deduplication.
#[allow(async_fn_in_trait)]
pub trait RestaurantRepository {
    async fn find(
        &self,
        name: &str,
        area: &str,
        city: &str,
    ) -> Result<Option<Restaurant>, ContentError>;
    async fn find_by_id(&self, id: ID<Restaurant>) -> Result<Option<Restaurant>, ContentError>;
    async fn exists_by_slug(&self, slug: &str) -> Result<bool, ContentError>;
    async fn create(&self, restaurant: &Restaurant) -> Result<(), ContentError>;
}

/// Find-or-create by (name, area, city). New restaurants get a derived
/// slug, renumbered with a hyphen suffix on collision.
pub async fn find_or_create<R>(
    repo: &R,
    name: &str,
    area: &str,
    maps_url: Option<&str>,
) -> Result<Restaurant, ContentError>
where
    R: RestaurantRepository,
{
    if let Some(existing) = repo.find(name, area, CITY).await? {
        return Ok(existing);
    }
    let slug = derive_slug(repo, name).await?;
    let restaurant = Restaurant::new(
        name.to_string(),
        slug,
        area.to_string(),
        CITY.to_string(),
        maps_url.map(String::from),
    );
    repo.create(&restaurant).await?;
    log::debug!("created restaurant {} ({})", restaurant.slug(), restaurant.id());
    Ok(restaurant)
}

async fn derive_slug<R>(repo: &R, name: &str) -> Result<String, ContentError>
where
    R: RestaurantRepository,
{
    for candidate in allocator::candidates(name, Charset::Slug) {
        if !repo.exists_by_slug(&candidate).await? {
            return Ok(candidate);
        }
    }
    unreachable!("candidate stream is infinite")
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use fl_pg::*;

    impl Schema for Restaurant {
        fn name() -> &'static str {
            RESTAURANTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                RESTAURANTS,
                " (
                    id         UUID PRIMARY KEY,
                    name       VARCHAR(255) NOT NULL,
                    slug       VARCHAR(100) NOT NULL,
                    area       VARCHAR(100) NOT NULL,
                    city       VARCHAR(100) NOT NULL,
                    maps_url   TEXT,
                    created_at TIMESTAMPTZ NOT NULL,
                    CONSTRAINT restaurants_slug_key UNIQUE (slug)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_restaurants_identity ON ",
                RESTAURANTS,
                " (name, area, city);"
            )
        }
    }
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use fl_pg::*;
    use std::sync::Arc;
    use tokio_postgres::Client;
    use tokio_postgres::Row;

    const COLUMNS: &str = "id, name, slug, area, city, maps_url, created_at";

    fn hydrate(row: &Row) -> Restaurant {
        Restaurant::hydrate(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            row.get::<_, String>(1),
            row.get::<_, String>(2),
            row.get::<_, String>(3),
            row.get::<_, String>(4),
            row.get::<_, Option<String>>(5),
            row.get::<_, SystemTime>(6),
        )
    }

    fn store(e: PgErr) -> ContentError {
        ContentError::Store(e.to_string())
    }

    impl RestaurantRepository for Arc<Client> {
        async fn find(
            &self,
            name: &str,
            area: &str,
            city: &str,
        ) -> Result<Option<Restaurant>, ContentError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT ",
                    COLUMNS,
                    " FROM ",
                    RESTAURANTS,
                    " WHERE name = $1 AND area = $2 AND city = $3"
                ),
                &[&name, &area, &city],
            )
            .await
            .map(|opt| opt.map(|row| hydrate(&row)))
            .map_err(store)
        }

        async fn find_by_id(
            &self,
            id: ID<Restaurant>,
        ) -> Result<Option<Restaurant>, ContentError> {
            self.query_opt(
                const_format::concatcp!(
                    "SELECT ",
                    COLUMNS,
                    " FROM ",
                    RESTAURANTS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await
            .map(|opt| opt.map(|row| hydrate(&row)))
            .map_err(store)
        }

        async fn exists_by_slug(&self, slug: &str) -> Result<bool, ContentError> {
            self.query_opt(
                const_format::concatcp!("SELECT 1 FROM ", RESTAURANTS, " WHERE slug = $1"),
                &[&slug],
            )
            .await
            .map(|opt| opt.is_some())
            .map_err(store)
        }

        async fn create(&self, restaurant: &Restaurant) -> Result<(), ContentError> {
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    RESTAURANTS,
                    " (id, name, slug, area, city, maps_url, created_at)
                      VALUES ($1, $2, $3, $4, $5, $6, $7)"
                ),
                &[
                    &restaurant.id().inner(),
                    &restaurant.name(),
                    &restaurant.slug(),
                    &restaurant.area(),
                    &restaurant.city(),
                    &restaurant.maps_url(),
                    &restaurant.created_at(),
                ],
            )
            .await
            .map(|_| ())
            .map_err(store)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Memory {
        rows: Mutex<Vec<Restaurant>>,
    }

    impl RestaurantRepository for Memory {
        async fn find(
            &self,
            name: &str,
            area: &str,
            city: &str,
        ) -> Result<Option<Restaurant>, ContentError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.name() == name && r.area() == area && r.city() == city)
                .cloned())
        }
        async fn find_by_id(
            &self,
            id: ID<Restaurant>,
        ) -> Result<Option<Restaurant>, ContentError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id() == id)
                .cloned())
        }
        async fn exists_by_slug(&self, slug: &str) -> Result<bool, ContentError> {
            Ok(self.rows.lock().unwrap().iter().any(|r| r.slug() == slug))
        }
        async fn create(&self, restaurant: &Restaurant) -> Result<(), ContentError> {
            self.rows.lock().unwrap().push(restaurant.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn second_lookup_reuses_the_first_row() {
        let repo = Memory::default();
        let first = find_or_create(&repo, "Karim's", "Old Delhi", None).await.unwrap();
        let second = find_or_create(&repo, "Karim's", "Old Delhi", None).await.unwrap();
        assert!(first == second);
        assert!(repo.rows.lock().unwrap().len() == 1);
    }

    #[tokio::test]
    async fn same_name_in_another_area_gets_a_suffixed_slug() {
        let repo = Memory::default();
        let first = find_or_create(&repo, "Karim's", "Old Delhi", None).await.unwrap();
        let second = find_or_create(&repo, "Karim's", "Nizamuddin", None).await.unwrap();
        assert!(first.slug() == "karims");
        assert!(second.slug() == "karims-1");
    }
}
