//! Deterministic demo catalog used by `consulty seed`, the chat loop's
//! in-memory mode, and the integration tests.

use rust_decimal::Decimal;

use consulty_core::domain::provider::{ProviderId, ProviderRecord};

use crate::repositories::RepositoryError;
use crate::DbPool;

pub struct SeedResult {
    pub providers_seeded: usize,
}

pub struct SeedVerification {
    pub checks: Vec<(&'static str, bool)>,
    pub all_present: bool,
}

struct Seed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    rating: f64,
    review_count: u32,
    hourly_rate: Option<i64>,
    location: &'static str,
    service_area: Option<&'static str>,
    remote: bool,
    experience_years: u32,
    response_time_hours: Option<f64>,
    available: bool,
    verified: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "legal-waxman",
        name: "Waxman & Cole",
        category: "Legal Advisory",
        description: "Contract review, commercial disputes, and startup counsel",
        rating: 4.8,
        review_count: 120,
        hourly_rate: Some(350),
        location: "New York, NY",
        service_area: Some("Tri-state area"),
        remote: true,
        experience_years: 15,
        response_time_hours: Some(1.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "legal-ortiz",
        name: "Ortiz Legal",
        category: "Attorney",
        description: "Employment law and contract drafting for small businesses",
        rating: 4.5,
        review_count: 85,
        hourly_rate: Some(180),
        location: "Austin, TX",
        service_area: Some("Texas"),
        remote: false,
        experience_years: 9,
        response_time_hours: Some(3.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "legal-cheng",
        name: "Cheng Contracts",
        category: "Law",
        description: "Fast remote contract review and redlining",
        rating: 4.2,
        review_count: 30,
        hourly_rate: Some(90),
        location: "Seattle, WA",
        service_area: None,
        remote: true,
        experience_years: 5,
        response_time_hours: Some(0.5),
        available: true,
        verified: true,
    },
    Seed {
        id: "finance-patel",
        name: "Patel Tax Partners",
        category: "Tax",
        description: "Personal and small-business tax planning and filings",
        rating: 4.7,
        review_count: 210,
        hourly_rate: Some(150),
        location: "Chicago, IL",
        service_area: Some("Illinois"),
        remote: true,
        experience_years: 18,
        response_time_hours: Some(2.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "finance-mori",
        name: "Mori Bookkeeping",
        category: "Accounting",
        description: "Monthly bookkeeping and payroll for startups",
        rating: 4.3,
        review_count: 40,
        hourly_rate: Some(60),
        location: "Portland, OR",
        service_area: None,
        remote: true,
        experience_years: 6,
        response_time_hours: Some(4.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "business-hale",
        name: "Hale Strategy Group",
        category: "Business Consulting",
        description: "Go-to-market strategy and operations for growing companies",
        rating: 4.6,
        review_count: 95,
        hourly_rate: Some(220),
        location: "Boston, MA",
        service_area: Some("New England"),
        remote: true,
        experience_years: 14,
        response_time_hours: Some(6.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "business-novak",
        name: "Novak Advisory",
        category: "Consulting",
        description: "Pricing, sales process, and early-stage fundraising help",
        rating: 4.1,
        review_count: 22,
        hourly_rate: Some(110),
        location: "Denver, CO",
        service_area: None,
        remote: true,
        experience_years: 7,
        response_time_hours: Some(1.0),
        available: false,
        verified: true,
    },
    Seed {
        id: "career-diaz",
        name: "Diaz Career Coaching",
        category: "Career Coaching",
        description: "Interview preparation, mock interviews, and offer negotiation",
        rating: 4.9,
        review_count: 140,
        hourly_rate: Some(95),
        location: "Remote",
        service_area: None,
        remote: true,
        experience_years: 11,
        response_time_hours: Some(1.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "career-kim",
        name: "Kim Resume Studio",
        category: "Career Counseling",
        description: "Resume rewrites and LinkedIn profile positioning",
        rating: 4.4,
        review_count: 55,
        hourly_rate: Some(70),
        location: "San Diego, CA",
        service_area: Some("Southern California"),
        remote: true,
        experience_years: 8,
        response_time_hours: Some(5.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "tech-rivera",
        name: "Rivera Software",
        category: "Software",
        description: "Web application development, audits, and rescues",
        rating: 4.8,
        review_count: 160,
        hourly_rate: Some(130),
        location: "Miami, FL",
        service_area: None,
        remote: true,
        experience_years: 12,
        response_time_hours: Some(2.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "tech-osei",
        name: "Osei IT Services",
        category: "IT Services",
        description: "Small-office networks, backups, and device management",
        rating: 4.0,
        review_count: 18,
        hourly_rate: Some(85),
        location: "Atlanta, GA",
        service_area: Some("Georgia"),
        remote: false,
        experience_years: 5,
        response_time_hours: Some(8.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "health-lund",
        name: "Lund Wellness",
        category: "Wellness",
        description: "Stress management and sleep coaching programs",
        rating: 4.6,
        review_count: 75,
        hourly_rate: Some(100),
        location: "Minneapolis, MN",
        service_area: None,
        remote: true,
        experience_years: 10,
        response_time_hours: Some(3.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "health-rowe",
        name: "Rowe Counseling",
        category: "Therapy",
        description: "Licensed counseling, sliding-scale pricing on request",
        rating: 4.5,
        review_count: 48,
        hourly_rate: None,
        location: "Nashville, TN",
        service_area: Some("Tennessee"),
        remote: true,
        experience_years: 13,
        response_time_hours: Some(12.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "marketing-vega",
        name: "Vega Digital",
        category: "Digital Marketing",
        description: "SEO audits, paid campaigns, and content calendars",
        rating: 4.5,
        review_count: 88,
        hourly_rate: Some(120),
        location: "Phoenix, AZ",
        service_area: None,
        remote: true,
        experience_years: 9,
        response_time_hours: Some(2.0),
        available: true,
        verified: true,
    },
    Seed {
        id: "edu-brooks",
        name: "Brooks Tutoring",
        category: "Tutoring",
        description: "Math and science tutoring, exam preparation",
        rating: 4.7,
        review_count: 65,
        hourly_rate: Some(45),
        location: "Columbus, OH",
        service_area: Some("Ohio"),
        remote: true,
        experience_years: 6,
        response_time_hours: Some(4.0),
        available: true,
        verified: true,
    },
    // Deliberately unverified; must never surface in results.
    Seed {
        id: "legal-quickfix",
        name: "Quick Legal Fix",
        category: "Legal Advisory",
        description: "Cheap same-day legal documents",
        rating: 5.0,
        review_count: 3,
        hourly_rate: Some(20),
        location: "Unknown",
        service_area: None,
        remote: true,
        experience_years: 1,
        response_time_hours: Some(0.1),
        available: true,
        verified: false,
    },
];

/// The seed catalog as in-memory records, in catalog natural order.
pub fn seed_providers() -> Vec<ProviderRecord> {
    SEEDS
        .iter()
        .map(|seed| ProviderRecord {
            id: ProviderId(seed.id.to_string()),
            name: seed.name.to_string(),
            category: seed.category.to_string(),
            description: seed.description.to_string(),
            rating: seed.rating,
            review_count: seed.review_count,
            hourly_rate: seed.hourly_rate.map(Decimal::from),
            location: seed.location.to_string(),
            service_area: seed.service_area.map(str::to_string),
            remote: seed.remote,
            experience_years: seed.experience_years,
            response_time_hours: seed.response_time_hours,
            available: seed.available,
            verified: seed.verified,
        })
        .collect()
}

/// Row count used by readiness checks.
pub async fn provider_count(pool: &DbPool) -> Result<i64, RepositoryError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM provider").fetch_one(pool).await?;
    Ok(count)
}

pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    /// Idempotently load the demo catalog. Rows keep their declared order
    /// as the catalog natural order.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        for (position, record) in seed_providers().into_iter().enumerate() {
            sqlx::query(
                "INSERT OR REPLACE INTO provider \
                     (id, name, category, description, rating, review_count, hourly_rate, \
                      location, service_area, remote, experience_years, response_time_hours, \
                      available, verified, position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )
            .bind(&record.id.0)
            .bind(&record.name)
            .bind(&record.category)
            .bind(&record.description)
            .bind(record.rating)
            .bind(i64::from(record.review_count))
            .bind(record.hourly_rate.map(|rate| rate.to_string()))
            .bind(&record.location)
            .bind(&record.service_area)
            .bind(record.remote)
            .bind(i64::from(record.experience_years))
            .bind(record.response_time_hours)
            .bind(record.available)
            .bind(record.verified)
            .bind(position as i64)
            .execute(pool)
            .await?;
        }

        Ok(SeedResult { providers_seeded: SEEDS.len() })
    }

    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, RepositoryError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM provider")
            .fetch_one(pool)
            .await?;
        let (verified,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM provider WHERE verified = 1")
                .fetch_one(pool)
                .await?;
        let (categories,): (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT category) FROM provider")
                .fetch_one(pool)
                .await?;

        let checks = vec![
            ("provider-rows", total == SEEDS.len() as i64),
            ("verified-majority", verified == (SEEDS.len() as i64) - 1),
            ("category-spread", categories >= 10),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(SeedVerification { checks, all_present })
    }
}

#[cfg(test)]
mod tests {
    use crate::{connect_with_settings, migrations};

    use super::{seed_providers, CatalogSeedDataset};

    #[test]
    fn seed_catalog_is_deterministic_and_mostly_verified() {
        let first = seed_providers();
        let second = seed_providers();
        assert_eq!(first, second);

        let unverified = first.iter().filter(|record| !record.verified).count();
        assert_eq!(unverified, 1);
    }

    #[tokio::test]
    async fn seed_loads_and_verifies_against_sqlite() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let result = CatalogSeedDataset::load(&pool).await.expect("load");
        assert_eq!(result.providers_seeded, seed_providers().len());

        let verification = CatalogSeedDataset::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);

        // Loading twice must not duplicate rows.
        CatalogSeedDataset::load(&pool).await.expect("reload");
        let verification = CatalogSeedDataset::verify(&pool).await.expect("reverify");
        assert!(verification.all_present);
    }
}
