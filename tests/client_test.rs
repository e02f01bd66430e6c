use std::time::Duration;

use coursehub::client::{ClientError, CourseApiClient, CourseForm};
use coursehub::config::ApiConfig;
use coursehub::models::{CourseImage, Instructor};

// Nothing listens on the discard port; a request that got this far would fail
// with an Http error, not a Validation error.
fn client() -> CourseApiClient {
    CourseApiClient::new(ApiConfig::new("http://127.0.0.1:9/api", Duration::from_millis(200)))
        .expect("Failed to build client")
}

fn instructor() -> Instructor {
    Instructor {
        id: "i1".to_string(),
        name: "Valid Instructor".to_string(),
        email: None,
    }
}

fn form() -> CourseForm {
    CourseForm {
        title: "Operating Systems".to_string(),
        description: "Processes, memory and files".to_string(),
        duration: "10 weeks".to_string(),
        video_link: String::new(),
        tags: "os, kernels".to_string(),
        is_published: true,
        payment: "3000".to_string(),
        discount: "0".to_string(),
        image: Some(CourseImage {
            file_name: "os.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        }),
    }
}

#[tokio::test]
async fn missing_image_is_rejected_before_any_request() {
    let mut form = form();
    form.image = None;

    match client().create_course(&form, &instructor()).await {
        Err(ClientError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "image");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn non_numeric_payment_is_rejected_before_any_request() {
    let mut form = form();
    form.payment = "abc".to_string();

    match client().create_course(&form, &instructor()).await {
        Err(ClientError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "payment");
            assert!(errors[0].message.contains("numeric"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn valid_form_reaches_the_network() {
    let result = client().create_course(&form(), &instructor()).await;
    assert!(matches!(result, Err(ClientError::Http(_))), "got {:?}", result);
}

#[test]
fn courses_url_uses_configured_base() {
    let client = CourseApiClient::new(ApiConfig::new("https://api.example.test/api/", Duration::from_secs(1))).unwrap();
    assert_eq!(client.courses_url(), "https://api.example.test/api/courses");
}
