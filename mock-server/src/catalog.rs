//! Lessons, ratings, purchases and payments.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;

use crate::models::{
    Checkout, CheckoutResult, Lesson, LessonStudent, LessonUpdate, NewLesson, NewRating, Payment, PaymentInitiation,
    Purchase, PurchaseRequest, Rating, TeacherStats, User,
};
use crate::state::{new_id, Db, SharedDb};
use crate::{caller, require_teacher, ApiResult, Failure};

const CURRENCY: &str = "USD";

fn lesson_from(teacher: &User, input: NewLesson) -> Lesson {
    Lesson {
        id: new_id("l"),
        title: input.title,
        description: input.description,
        subject: input.subject,
        level: input.level,
        price: input.price,
        duration_minutes: input.duration_minutes,
        teacher_id: teacher.id.clone(),
        teacher_name: Some(teacher.full_name()),
        video_url: None,
        thumbnail_url: None,
        average_rating: None,
        rating_count: 0,
        created_at: Utc::now(),
    }
}

fn owned_lesson<'a>(db: &'a mut Db, user: &User, id: &str) -> ApiResult<&'a mut Lesson> {
    let lesson = db
        .lessons
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| Failure::not_found("Lesson"))?;
    if lesson.teacher_id != user.id {
        return Err(Failure::forbidden("You can only manage your own lessons"));
    }
    Ok(lesson)
}

pub async fn list_lessons(State(db): State<SharedDb>) -> Json<Vec<Lesson>> {
    Json(db.read().await.lessons.clone())
}

pub async fn get_lesson(State(db): State<SharedDb>, Path(id): Path<String>) -> ApiResult<Json<Lesson>> {
    let db = db.read().await;
    db.lesson(&id).cloned().map(Json).ok_or_else(|| Failure::not_found("Lesson"))
}

/// Multipart upload: metadata fields plus a `video` file and optional `thumbnail`.
pub async fn create_lesson(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let teacher = caller(&*db.read().await, &headers)?;
    require_teacher(&teacher)?;

    let mut fields = HashMap::new();
    let mut files = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Failure::bad_request(&e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await.map_err(|e| Failure::bad_request(&e.body_text()))?;
                files.insert(name, (file_name, bytes.len()));
            }
            None => {
                let text = field.text().await.map_err(|e| Failure::bad_request(&e.body_text()))?;
                fields.insert(name, text);
            }
        }
    }

    let text = |key: &str| fields.get(key).cloned().unwrap_or_default();
    let (video_name, video_len) = files
        .get("video")
        .cloned()
        .ok_or_else(|| Failure::bad_request("A lesson video is required"))?;
    if text("title").trim().is_empty() {
        return Err(Failure::bad_request("Title is required"));
    }
    tracing::debug!(video = %video_name, bytes = video_len, "lesson upload");

    let mut lesson = lesson_from(
        &teacher,
        NewLesson {
            title: text("title"),
            description: text("description"),
            subject: text("subject"),
            level: text("level"),
            price: text("price").parse().unwrap_or(0.0),
            duration_minutes: text("durationMinutes").parse().unwrap_or(0),
        },
    );
    lesson.video_url = Some(format!("https://videos.example.com/{}/{video_name}", lesson.id));
    lesson.thumbnail_url = files
        .get("thumbnail")
        .map(|(name, _)| format!("https://images.example.com/{}/{name}", lesson.id));

    db.write().await.lessons.push(lesson.clone());
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn update_lesson(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<LessonUpdate>,
) -> ApiResult<Json<Lesson>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    let lesson = owned_lesson(&mut db, &user, &id)?;
    if let Some(title) = input.title {
        lesson.title = title;
    }
    if let Some(description) = input.description {
        lesson.description = description;
    }
    if let Some(subject) = input.subject {
        lesson.subject = subject;
    }
    if let Some(level) = input.level {
        lesson.level = level;
    }
    if let Some(price) = input.price {
        lesson.price = price;
    }
    if let Some(minutes) = input.duration_minutes {
        lesson.duration_minutes = minutes;
    }
    Ok(Json(lesson.clone()))
}

pub async fn delete_lesson(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    owned_lesson(&mut db, &user, &id)?;
    db.lessons.retain(|l| l.id != id);
    db.ratings.retain(|r| r.lesson_id != id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_ratings(State(db): State<SharedDb>, Path(id): Path<String>) -> ApiResult<Json<Vec<Rating>>> {
    let db = db.read().await;
    db.lesson(&id).ok_or_else(|| Failure::not_found("Lesson"))?;
    Ok(Json(db.ratings.iter().filter(|r| r.lesson_id == id).cloned().collect()))
}

pub async fn create_rating(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<NewRating>,
) -> ApiResult<(StatusCode, Json<Rating>)> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    let teacher_id = db
        .lesson(&id)
        .map(|l| l.teacher_id.clone())
        .ok_or_else(|| Failure::not_found("Lesson"))?;
    if !db.has_purchased(&user.id, &id) {
        return Err(Failure::forbidden("Purchase the lesson before rating it"));
    }
    if !(1..=5).contains(&input.score) {
        return Err(Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "Score must be between 1 and 5"));
    }
    let rating = Rating {
        id: new_id("r"),
        lesson_id: id.clone(),
        student_id: user.id.clone(),
        student_name: Some(user.full_name()),
        score: input.score,
        comment: input.comment,
        created_at: Utc::now(),
    };
    db.ratings.push(rating.clone());
    db.refresh_rating(&id);
    db.notify(&teacher_id, "rating", "New rating", &format!("{} rated your lesson", user.full_name()));
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn student_lessons(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<Vec<Lesson>>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    Ok(Json(
        db.lessons
            .iter()
            .filter(|l| db.has_purchased(&user.id, &l.id))
            .cloned()
            .collect(),
    ))
}

pub async fn student_purchases(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<Vec<Purchase>>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    Ok(Json(
        db.purchases
            .iter()
            .filter(|p| p.student_id == user.id)
            .cloned()
            .collect(),
    ))
}

pub async fn student_purchase(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<PurchaseRequest>,
) -> ApiResult<(StatusCode, Json<Purchase>)> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    let price = db
        .lesson(&input.lesson_id)
        .map(|l| l.price)
        .ok_or_else(|| Failure::not_found("Lesson"))?;
    if db.has_purchased(&user.id, &input.lesson_id) {
        return Err(Failure::new(StatusCode::CONFLICT, "Lesson already purchased"));
    }
    let purchase = Purchase {
        id: new_id("p"),
        lesson_id: input.lesson_id,
        student_id: user.id,
        amount: price,
        currency: CURRENCY.to_string(),
        status: "pending".to_string(),
        created_at: Utc::now(),
    };
    db.purchases.push(purchase.clone());
    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn teacher_lessons(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<Vec<Lesson>>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    require_teacher(&user)?;
    Ok(Json(
        db.lessons
            .iter()
            .filter(|l| l.teacher_id == user.id)
            .cloned()
            .collect(),
    ))
}

pub async fn teacher_create_lesson(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<NewLesson>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    require_teacher(&user)?;
    let lesson = lesson_from(&user, input);
    db.lessons.push(lesson.clone());
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn teacher_lesson_students(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<LessonStudent>>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    owned_lesson(&mut db, &user, &id)?;
    let students = db
        .purchases
        .iter()
        .filter(|p| p.lesson_id == id)
        .filter_map(|p| {
            db.users.get(&p.student_id).map(|s| LessonStudent {
                id: s.id.clone(),
                name: s.full_name(),
                email: s.email.clone(),
                purchased_at: p.created_at,
            })
        })
        .collect();
    Ok(Json(students))
}

pub async fn teacher_stats(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<TeacherStats>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    require_teacher(&user)?;

    let own: Vec<&Lesson> = db.lessons.iter().filter(|l| l.teacher_id == user.id).collect();
    let sales: Vec<&Purchase> = db
        .purchases
        .iter()
        .filter(|p| own.iter().any(|l| l.id == p.lesson_id))
        .collect();
    let mut students: Vec<&str> = sales.iter().map(|p| p.student_id.as_str()).collect();
    students.sort_unstable();
    students.dedup();
    let rated: Vec<f64> = own.iter().filter_map(|l| l.average_rating).collect();

    Ok(Json(TeacherStats {
        total_lessons: own.len() as u32,
        total_students: students.len() as u32,
        total_revenue: sales.iter().map(|p| p.amount).sum(),
        average_rating: (!rated.is_empty()).then(|| rated.iter().sum::<f64>() / rated.len() as f64),
    }))
}

pub async fn list_purchases(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<Vec<Purchase>>> {
    student_purchases(State(db), headers).await
}

pub async fn checkout(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<Checkout>,
) -> ApiResult<Json<CheckoutResult>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    if input.lesson_ids.is_empty() {
        return Err(Failure::bad_request("Cart is empty"));
    }
    let mut purchases = Vec::new();
    for lesson_id in &input.lesson_ids {
        let price = db
            .lesson(lesson_id)
            .map(|l| l.price)
            .ok_or_else(|| Failure::not_found("Lesson"))?;
        purchases.push(Purchase {
            id: new_id("p"),
            lesson_id: lesson_id.clone(),
            student_id: user.id.clone(),
            amount: price,
            currency: CURRENCY.to_string(),
            status: "completed".to_string(),
            created_at: Utc::now(),
        });
    }
    tracing::debug!(method = %input.payment_method, items = purchases.len(), "checkout");
    db.purchases.extend(purchases.iter().cloned());
    db.notify(
        &user.id,
        "purchase",
        "Purchase confirmed",
        &format!("{} lesson(s) added to your library", purchases.len()),
    );
    Ok(Json(CheckoutResult {
        total_amount: purchases.iter().map(|p| p.amount).sum(),
        currency: CURRENCY.to_string(),
        purchases,
    }))
}

fn start_payment(db: &Db, user: &User, input: &Payment, prefix: &str) -> ApiResult<String> {
    let purchase = db
        .purchases
        .iter()
        .find(|p| p.id == input.purchase_id && p.student_id == user.id)
        .ok_or_else(|| Failure::not_found("Purchase"))?;
    if input.amount <= 0.0 || input.currency.is_empty() {
        return Err(Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid amount"));
    }
    Ok(format!("{prefix}-{}", purchase.id))
}

pub async fn initiate_mobile_money(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<Payment>,
) -> ApiResult<Json<PaymentInitiation>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    let phone = input
        .phone_number
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "Phone number is required"))?;
    let reference = start_payment(&db, &user, &input, "MM")?;
    Ok(Json(PaymentInitiation {
        reference,
        status: "pending".to_string(),
        instructions: Some(format!(
            "Approve the {} prompt sent to {phone}",
            input.provider.as_deref().unwrap_or("mobile money")
        )),
    }))
}

pub async fn initiate_bank_transfer(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<Payment>,
) -> ApiResult<Json<PaymentInitiation>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    if input.account_number.as_deref().unwrap_or_default().is_empty() {
        return Err(Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "Account number is required"));
    }
    let reference = start_payment(&db, &user, &input, "BT")?;
    Ok(Json(PaymentInitiation {
        instructions: Some(format!(
            "Transfer {:.2} {} quoting reference {reference} via {}",
            input.amount,
            input.currency,
            input.bank_name.as_deref().unwrap_or("your bank")
        )),
        reference,
        status: "awaiting_transfer".to_string(),
    }))
}
