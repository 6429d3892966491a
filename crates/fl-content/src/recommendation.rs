use super::*;
use fl_auth::Creator;
use fl_core::ID;
use fl_core::Unique;
use std::time::SystemTime;

/// A creator's published dish recommendation at a restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    id: ID<Self>,
    creator: ID<Creator>,
    restaurant: ID<Restaurant>,
    dish_name: String,
    quote: Option<String>,
    description: Option<String>,
    details: DishDetails,
    created_at: SystemTime,
}

/// Free-form editorial fields on a recommendation. All optional; tags
/// default to empty. Flattened into the request and response shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct DishDetails {
    pub full_address: Option<String>,
    pub dish_category: Option<String>,
    pub cuisine_type: Option<String>,
    pub meal_type: Option<String>,
    pub price_range: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Recommendation {
    pub fn new(
        creator: ID<Creator>,
        restaurant: ID<Restaurant>,
        dish_name: String,
        quote: Option<String>,
        description: Option<String>,
        details: DishDetails,
    ) -> Self {
        Self {
            id: ID::default(),
            creator,
            restaurant,
            dish_name,
            quote,
            description,
            details,
            created_at: SystemTime::now(),
        }
    }
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ID<Self>,
        creator: ID<Creator>,
        restaurant: ID<Restaurant>,
        dish_name: String,
        quote: Option<String>,
        description: Option<String>,
        details: DishDetails,
        created_at: SystemTime,
    ) -> Self {
        Self {
            id,
            creator,
            restaurant,
            dish_name,
            quote,
            description,
            details,
            created_at,
        }
    }
    pub fn creator(&self) -> ID<Creator> {
        self.creator
    }
    pub fn restaurant(&self) -> ID<Restaurant> {
        self.restaurant
    }
    pub fn dish_name(&self) -> &str {
        &self.dish_name
    }
    pub fn quote(&self) -> Option<&str> {
        self.quote.as_deref()
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    pub fn details(&self) -> &DishDetails {
        &self.details
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

impl Unique for Recommendation {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateRecommendationRequest {
    pub dish_name: String,
    pub restaurant_name: String,
    pub area: String,
    #[serde(default)]
    pub maps_url: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub details: DishDetails,
}

#[derive(Debug, serde::Serialize)]
pub struct RecommendationInfo {
    pub id: String,
    pub dish_name: String,
    pub restaurant: String,
    pub restaurant_slug: String,
    pub area: String,
    pub maps_url: Option<String>,
    pub quote: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub details: DishDetails,
}

#[allow(async_fn_in_trait)]
pub trait RecommendationRepository {
    async fn list_by_creator(
        &self,
        creator: ID<Creator>,
    ) -> Result<Vec<Recommendation>, ContentError>;
    async fn create(&self, recommendation: &Recommendation) -> Result<(), ContentError>;
}

/// Publishes a recommendation for the (explicitly passed) authenticated
/// creator, deduplicating the restaurant behind find-or-create.
pub async fn recommend<R>(
    repo: &R,
    creator: ID<Creator>,
    req: CreateRecommendationRequest,
) -> Result<RecommendationInfo, ContentError>
where
    R: RecommendationRepository + RestaurantRepository,
{
    let dish_name = req.dish_name.trim().to_string();
    if dish_name.is_empty() {
        return Err(ContentError::Malformed("dish name must not be empty".to_string()));
    }
    if req.restaurant_name.trim().is_empty() {
        return Err(ContentError::Malformed("restaurant name must not be empty".to_string()));
    }
    let mut details = req.details;
    details.tags = details
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let restaurant = find_or_create(
        repo,
        req.restaurant_name.trim(),
        req.area.trim(),
        req.maps_url.as_deref(),
    )
    .await?;
    let recommendation = Recommendation::new(
        creator,
        restaurant.id(),
        dish_name,
        req.quote,
        req.description,
        details,
    );
    RecommendationRepository::create(repo, &recommendation).await?;
    Ok(render(&recommendation, &restaurant))
}

/// A creator's recommendations, joined with their restaurants.
pub async fn listing<R>(
    repo: &R,
    creator: ID<Creator>,
) -> Result<Vec<RecommendationInfo>, ContentError>
where
    R: RecommendationRepository + RestaurantRepository,
{
    let mut infos = Vec::new();
    for recommendation in repo.list_by_creator(creator).await? {
        let restaurant = repo
            .find_by_id(recommendation.restaurant())
            .await?
            .ok_or(ContentError::NotFound("restaurant"))?;
        infos.push(render(&recommendation, &restaurant));
    }
    Ok(infos)
}

fn render(recommendation: &Recommendation, restaurant: &Restaurant) -> RecommendationInfo {
    RecommendationInfo {
        id: recommendation.id().to_string(),
        dish_name: recommendation.dish_name().to_string(),
        restaurant: restaurant.name().to_string(),
        restaurant_slug: restaurant.slug().to_string(),
        area: restaurant.area().to_string(),
        maps_url: restaurant.maps_url().map(String::from),
        quote: recommendation.quote().map(String::from),
        description: recommendation.description().map(String::from),
        details: recommendation.details().clone(),
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use fl_pg::*;

    impl Schema for Recommendation {
        fn name() -> &'static str {
            RECOMMENDATIONS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                RECOMMENDATIONS,
                " (
                    id            UUID PRIMARY KEY,
                    creator_id    UUID NOT NULL REFERENCES ",
                CREATORS,
                "(id) ON DELETE CASCADE,
                    restaurant_id UUID NOT NULL REFERENCES ",
                RESTAURANTS,
                "(id),
                    dish_name     VARCHAR(255) NOT NULL,
                    quote         TEXT,
                    description   TEXT,
                    full_address  TEXT,
                    dish_category VARCHAR(100),
                    cuisine_type  VARCHAR(100),
                    meal_type     VARCHAR(50),
                    price_range   VARCHAR(50),
                    tags          TEXT[] NOT NULL DEFAULT '{}',
                    created_at    TIMESTAMPTZ NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_recommendations_creator ON ",
                RECOMMENDATIONS,
                " (creator_id);"
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

    const COLUMNS: &str = "id, creator_id, restaurant_id, dish_name, quote, description,
                           full_address, dish_category, cuisine_type, meal_type, price_range,
                           tags, created_at";

    fn hydrate(row: &Row) -> Recommendation {
        Recommendation::hydrate(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            ID::from(row.get::<_, uuid::Uuid>(1)),
            ID::from(row.get::<_, uuid::Uuid>(2)),
            row.get::<_, String>(3),
            row.get::<_, Option<String>>(4),
            row.get::<_, Option<String>>(5),
            DishDetails {
                full_address: row.get::<_, Option<String>>(6),
                dish_category: row.get::<_, Option<String>>(7),
                cuisine_type: row.get::<_, Option<String>>(8),
                meal_type: row.get::<_, Option<String>>(9),
                price_range: row.get::<_, Option<String>>(10),
                tags: row.get::<_, Vec<String>>(11),
            },
            row.get::<_, SystemTime>(12),
        )
    }

    fn store(e: PgErr) -> ContentError {
        ContentError::Store(e.to_string())
    }

    impl RecommendationRepository for Arc<Client> {
        async fn list_by_creator(
            &self,
            creator: ID<Creator>,
        ) -> Result<Vec<Recommendation>, ContentError> {
            self.query(
                const_format::concatcp!(
                    "SELECT ",
                    COLUMNS,
                    " FROM ",
                    RECOMMENDATIONS,
                    " WHERE creator_id = $1 ORDER BY created_at DESC"
                ),
                &[&creator.inner()],
            )
            .await
            .map(|rows| rows.iter().map(hydrate).collect())
            .map_err(store)
        }

        async fn create(&self, recommendation: &Recommendation) -> Result<(), ContentError> {
            let details = recommendation.details();
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    RECOMMENDATIONS,
                    " (",
                    COLUMNS,
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
                ),
                &[
                    &recommendation.id().inner(),
                    &recommendation.creator().inner(),
                    &recommendation.restaurant().inner(),
                    &recommendation.dish_name(),
                    &recommendation.quote(),
                    &recommendation.description(),
                    &details.full_address,
                    &details.dish_category,
                    &details.cuisine_type,
                    &details.meal_type,
                    &details.price_range,
                    &details.tags,
                    &recommendation.created_at(),
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
        restaurants: Mutex<Vec<Restaurant>>,
        recommendations: Mutex<Vec<Recommendation>>,
    }

    impl RestaurantRepository for Memory {
        async fn find(
            &self,
            name: &str,
            area: &str,
            city: &str,
        ) -> Result<Option<Restaurant>, ContentError> {
            Ok(self
                .restaurants
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
                .restaurants
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id() == id)
                .cloned())
        }
        async fn exists_by_slug(&self, slug: &str) -> Result<bool, ContentError> {
            Ok(self
                .restaurants
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.slug() == slug))
        }
        async fn create(&self, restaurant: &Restaurant) -> Result<(), ContentError> {
            self.restaurants.lock().unwrap().push(restaurant.clone());
            Ok(())
        }
    }

    impl RecommendationRepository for Memory {
        async fn list_by_creator(
            &self,
            creator: ID<Creator>,
        ) -> Result<Vec<Recommendation>, ContentError> {
            Ok(self
                .recommendations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.creator() == creator)
                .cloned()
                .collect())
        }
        async fn create(&self, recommendation: &Recommendation) -> Result<(), ContentError> {
            self.recommendations
                .lock()
                .unwrap()
                .push(recommendation.clone());
            Ok(())
        }
    }

    fn request(dish: &str, restaurant: &str) -> CreateRecommendationRequest {
        CreateRecommendationRequest {
            dish_name: dish.to_string(),
            restaurant_name: restaurant.to_string(),
            area: "Old Delhi".to_string(),
            maps_url: None,
            quote: None,
            description: None,
            details: DishDetails::default(),
        }
    }

    #[tokio::test]
    async fn listing_returns_only_the_creators_own_items() {
        let repo = Memory::default();
        let mine = ID::default();
        let theirs = ID::default();
        recommend(&repo, mine, request("Mutton Korma", "Karim's"))
            .await
            .unwrap();
        recommend(&repo, theirs, request("Butter Chicken", "Moti Mahal"))
            .await
            .unwrap();
        let infos = listing(&repo, mine).await.unwrap();
        assert!(infos.len() == 1);
        assert!(infos[0].dish_name == "Mutton Korma");
        assert!(infos[0].restaurant_slug == "karims");
    }

    #[tokio::test]
    async fn dish_details_survive_into_the_listing() {
        let repo = Memory::default();
        let creator = ID::default();
        let mut req = request("Mutton Korma", "Karim's");
        req.details = DishDetails {
            full_address: Some("16 Gali Kababian".to_string()),
            dish_category: Some("Main".to_string()),
            cuisine_type: Some("Mughlai".to_string()),
            meal_type: Some("Dinner".to_string()),
            price_range: Some("₹₹".to_string()),
            tags: vec!["  korma ".to_string(), "".to_string(), "halal".to_string()],
        };
        recommend(&repo, creator, req).await.unwrap();
        let infos = listing(&repo, creator).await.unwrap();
        assert!(infos[0].details.cuisine_type.as_deref() == Some("Mughlai"));
        assert!(infos[0].details.price_range.as_deref() == Some("₹₹"));
        // tags are trimmed and empties dropped before storage
        assert!(infos[0].details.tags == vec!["korma".to_string(), "halal".to_string()]);
    }

    #[tokio::test]
    async fn empty_dish_name_is_malformed() {
        let repo = Memory::default();
        let err = recommend(&repo, ID::default(), request("   ", "Karim's"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Malformed(_)));
        assert!(repo.recommendations.lock().unwrap().is_empty());
    }
}
