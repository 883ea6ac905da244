//! End-to-end: the typed client against a live server on an ephemeral port.

use tuition_client::{ClientError, PaymentListing, TuitionClient};
use tuition_hex::{TuitionService, inbound::HttpServer};
use tuition_repo::build_repo;
use tuition_types::{
    BranchId, CreateBranchRequest, CreateCourseRequest, CreateUserRequest, CurrencyCode,
    FinalizeRegistrationRequest, GradeId, NewGrade, NewGradeFee, StudentDetailsId,
};

async fn spawn_server(upload_dir: &std::path::Path) -> TuitionClient {
    let repo = build_repo("sqlite::memory:").await.unwrap();
    let service = TuitionService::new(repo).with_default_admission_fee(1000);
    let router = HttpServer::new(service, upload_dir).router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TuitionClient::new(format!("http://{addr}"))
}

fn registration(branch: BranchId, grade: GradeId) -> FinalizeRegistrationRequest {
    FinalizeRegistrationRequest {
        user: CreateUserRequest {
            first_name: "Amaya".to_string(),
            last_name: "Fernando".to_string(),
            gender: Some("F".to_string()),
            username: "amaya".to_string(),
            password: "secret".to_string(),
            email: "amaya@example.com".to_string(),
            phn_num: "0712223334".to_string(),
            address: None,
            date_of_birth: None,
            role: None,
            status: None,
        },
        student_no: "ST-100".to_string(),
        ice_contact: None,
        salutation: None,
        grade_ids: vec![grade],
        slot_ids: vec![],
        branch_ids: vec![branch],
    }
}

#[tokio::test]
async fn test_register_quote_and_pay() {
    let dir = tempfile::tempdir().unwrap();
    let client = spawn_server(dir.path()).await;
    assert!(client.health().await.unwrap());

    let branch = client
        .create_branch(&CreateBranchRequest {
            branch_name: "Negombo".to_string(),
            currency: CurrencyCode::parse("LKR").unwrap(),
            status: None,
        })
        .await
        .unwrap();
    let course = client
        .create_course(&CreateCourseRequest {
            course_code: "ENG".to_string(),
            name: "English".to_string(),
            status: None,
            grades: vec![NewGrade {
                grade_name: "Grade 9".to_string(),
                status: None,
                grade_fees: vec![NewGradeFee {
                    branch_id: branch.id,
                    fee: 3000,
                }],
            }],
        })
        .await
        .unwrap();
    let grade = course.grades[0].grade.id;

    let profile = client
        .register_student(&registration(branch.id, grade))
        .await
        .unwrap();
    let sid = profile.details.id;
    assert_eq!(profile.details.photo_url, "/default-avatar.png");

    let quote = client.fee_quote(sid).await.unwrap();
    // No admission fee configured for the branch: the service default applies.
    assert_eq!(quote.quote.total_fees, 3000 + 1000);

    let created = client.pay(sid, None).await.unwrap();
    assert_eq!(created.payment.amount, 4000);

    let paid = client.list_payments(PaymentListing::Paid).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].full_name, "Amaya Fernando");

    let found = client.search_students(None, Some("amay")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].student_details_id, sid);

    let uploaded = client
        .upload_photo(profile.user.id, "face.jpg", b"jpeg bytes".to_vec())
        .await
        .unwrap();
    assert!(uploaded.photo_url.ends_with(".jpg"));
}

#[tokio::test]
async fn test_api_errors_carry_status_and_message() {
    let dir = tempfile::tempdir().unwrap();
    let client = spawn_server(dir.path()).await;

    let err = client
        .fee_quote(StudentDetailsId::new(77))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("77"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
