use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::database::Database;
use crate::models::{SeatClass, Theatre, TimeSlot};

/// Populates an empty database with sample users, movies, theatres and a
/// day of shows with full seat maps. Skipped entirely once movies exist.
pub async fn seed_sample_data(db: &Database) -> Result<(), sqlx::Error> {
    let movie_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
        .fetch_one(&db.pool)
        .await?;
    if movie_count > 0 {
        debug!("sample data already present, skipping seed");
        return Ok(());
    }

    info!("Seeding sample data...");

    create_user(db, "john", "john@example.com", "password123").await?;
    create_user(db, "admin", "admin@example.com", "admin123").await?;

    let inception = create_movie(
        db,
        "Inception",
        "A mind-bending thriller",
        "English",
        "Sci-Fi",
        148,
    )
    .await?;
    let dark_knight = create_movie(
        db,
        "The Dark Knight",
        "Batman saves Gotham",
        "English",
        "Action",
        152,
    )
    .await?;
    let rrr = create_movie(db, "RRR", "Epic period action drama", "Telugu", "Action", 187).await?;

    let pvr = create_theatre(db, "PVR Cinemas", "Mumbai", "Phoenix Mall, Lower Parel", 100).await?;
    let inox = create_theatre(db, "INOX", "Mumbai", "R City Mall, Ghatkopar", 120).await?;
    let cinepolis =
        create_theatre(db, "Cinepolis", "Delhi", "DLF Mall of India, Noida", 150).await?;

    let today = Local::now().date_naive();
    create_day_of_shows(db, inception, &pvr, today).await?;
    create_day_of_shows(db, inception, &inox, today).await?;
    create_day_of_shows(db, dark_knight, &pvr, today).await?;
    create_day_of_shows(db, rrr, &cinepolis, today).await?;

    info!("Sample data seeded (demo logins: john/password123, admin/admin123)");
    Ok(())
}

async fn create_user(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
) -> Result<i64, sqlx::Error> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| sqlx::Error::Protocol(format!("bcrypt failure: {}", e)))?;
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(hash)
    .fetch_one(&db.pool)
    .await
}

async fn create_movie(
    db: &Database,
    title: &str,
    description: &str,
    language: &str,
    genre: &str,
    duration_minutes: i32,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO movies (title, description, language, genre, duration_minutes, rating)
         VALUES ($1, $2, $3, $4, $5, 'UA') RETURNING id",
    )
    .bind(title)
    .bind(description)
    .bind(language)
    .bind(genre)
    .bind(duration_minutes)
    .fetch_one(&db.pool)
    .await
}

async fn create_theatre(
    db: &Database,
    name: &str,
    city: &str,
    address: &str,
    total_seats: i32,
) -> Result<Theatre, sqlx::Error> {
    sqlx::query_as::<_, Theatre>(
        "INSERT INTO theatres (name, city, address, total_seats)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(city)
    .bind(address)
    .bind(total_seats)
    .fetch_one(&db.pool)
    .await
}

/// Four show slots per movie/theatre pairing for one day.
async fn create_day_of_shows(
    db: &Database,
    movie_id: i64,
    theatre: &Theatre,
    date: NaiveDate,
) -> Result<(), sqlx::Error> {
    let schedule: [(u32, u32, f64); 4] = [
        (10, 0, 200.0),
        (14, 0, 150.0),
        (18, 30, 250.0),
        (21, 30, 220.0),
    ];

    for (hour, minute, base_price) in schedule {
        let starts_at = date
            .and_hms_opt(hour, minute, 0)
            .expect("schedule times are valid");
        let slot = TimeSlot::from_hour(hour);

        let show_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO shows (movie_id, theatre_id, starts_at, slot, base_price,
                                total_seats, available_seats)
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING id",
        )
        .bind(movie_id)
        .bind(theatre.id)
        .bind(starts_at)
        .bind(slot)
        .bind(base_price)
        .bind(theatre.total_seats)
        .fetch_one(&db.pool)
        .await?;

        create_seats_for_show(db, show_id, theatre.total_seats, base_price).await?;
    }

    Ok(())
}

/// 60% Regular at base price, 30% Premium at 1.5x, remainder VIP at 2x.
async fn create_seats_for_show(
    db: &Database,
    show_id: i64,
    total_seats: i32,
    base_price: f64,
) -> Result<(), sqlx::Error> {
    let regular = (total_seats as f64 * 0.6) as i32;
    let premium = (total_seats as f64 * 0.3) as i32;
    let vip = total_seats - regular - premium;

    let mut counter = 1;
    for _ in 0..regular {
        let label = format!("R{}", counter);
        create_seat(db, show_id, &label, SeatClass::Regular, base_price).await?;
        counter += 1;
    }
    for _ in 0..premium {
        let label = format!("P{}", counter);
        create_seat(db, show_id, &label, SeatClass::Premium, base_price * 1.5).await?;
        counter += 1;
    }
    for _ in 0..vip {
        let label = format!("V{}", counter);
        create_seat(db, show_id, &label, SeatClass::Vip, base_price * 2.0).await?;
        counter += 1;
    }

    Ok(())
}

async fn create_seat(
    db: &Database,
    show_id: i64,
    label: &str,
    class: SeatClass,
    price: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO seats (show_id, label, class, price, status)
         VALUES ($1, $2, $3, $4, 'available')",
    )
    .bind(show_id)
    .bind(label)
    .bind(class)
    .bind(price)
    .execute(&db.pool)
    .await?;
    Ok(())
}
