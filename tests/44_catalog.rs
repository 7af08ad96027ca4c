mod common;

use anyhow::Result;
use coursemart_api::database::models::Course;
use coursemart_api::filter::{Filter, FilterError};
use serde_json::json;

async fn seeded_catalog() -> Result<Vec<Course>> {
    let server = common::spawn_server().await?;
    let token = common::instructor_token("inst-1");

    let courses = [
        ("Design Fundamentals", 10.0, "Design", "Beginner"),
        ("Advanced Rust Services", 50.0, "Development", "Advanced"),
        ("Color Theory for Designers", 30.0, "Design", "Intermediate"),
        ("Rust for Everyone", 0.0, "Development", "All Levels"),
    ];
    for (title, price, category, level) in courses {
        let mut body = common::course_body(title, price, category);
        body["specifications"] = json!({ "level": level });
        server.create_course(&token, body).await?;
        // Distinct createdAt values for the date sorts
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    Ok(server.get("/api/courses").send().await?.json().await?)
}

fn titles(view: &[Course]) -> Vec<&str> {
    view.iter().map(|c| c.title.as_str()).collect()
}

#[tokio::test]
async fn category_filter_with_price_sort() -> Result<()> {
    let catalog = seeded_catalog().await?;

    let view = Filter::new().category("Design").order("price-asc")?.apply(&catalog);
    assert_eq!(titles(&view), vec!["Design Fundamentals", "Color Theory for Designers"]);
    Ok(())
}

#[tokio::test]
async fn search_and_level_compose() -> Result<()> {
    let catalog = seeded_catalog().await?;

    let view = Filter::new().search("  rust ").order("price-desc")?.apply(&catalog);
    assert_eq!(titles(&view), vec!["Advanced Rust Services", "Rust for Everyone"]);

    let view = Filter::new().search("rust").level("All Levels").apply(&catalog);
    assert_eq!(titles(&view), vec!["Rust for Everyone"]);
    Ok(())
}

#[tokio::test]
async fn date_sorts_follow_creation_order() -> Result<()> {
    let catalog = seeded_catalog().await?;

    let newest = Filter::new().category("All").level("All").apply(&catalog);
    assert_eq!(newest.first().map(|c| c.title.as_str()), Some("Rust for Everyone"));

    let oldest = Filter::new().order("date-asc")?.apply(&catalog);
    assert_eq!(oldest.first().map(|c| c.title.as_str()), Some("Design Fundamentals"));
    assert_eq!(oldest.len(), 4);
    Ok(())
}

#[tokio::test]
async fn unknown_sort_key_is_an_error() {
    let err = Filter::new().order("most-popular").unwrap_err();
    assert_eq!(err, FilterError::UnsupportedSortKey("most-popular".to_string()));
}

#[tokio::test]
async fn loosely_shaped_courses_still_list_and_filter() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = common::instructor_token("inst-1");

    let mut odd = common::course_body("Odd Profile Course", 15.0, "Design");
    odd["instructor"] = json!({ "bio": 123, "avatar": false });
    odd["specifications"] = json!({ "level": "Beginner", "subtitles": null });
    odd["syllabus"] = json!([{ "title": "Intro", "lessons": null }]);
    server.create_course(&token, odd).await?;
    server.create_course(&token, common::course_body("Plain Course", 5.0, "Development")).await?;

    let catalog: Vec<Course> = server.get("/api/courses").send().await?.json().await?;
    assert_eq!(catalog.len(), 2);

    let view = Filter::new().category("Design").level("Beginner").apply(&catalog);
    assert_eq!(titles(&view), vec!["Odd Profile Course"]);
    assert_eq!(view[0].instructor.bio.as_deref(), Some("123"));
    assert!(view[0].syllabus[0].lessons.is_empty());
    Ok(())
}
