//! End-to-end pipeline tests with stubbed collaborators.

use async_trait::async_trait;
use codegate_instruction::InstructionStatus;
use codegate_review::{CodeReviewer, ReviewConfig};
use codegate_test_utils::{approved_instruction, clean_artifact, memory_manager, temp_manager};
use codegate_workflow::{
    CodeGenerator, CollaboratorError, ReviewService, WorkflowError, WorkflowExecutor,
};
use std::sync::Arc;

struct StaticGenerator(&'static str);

#[async_trait]
impl CodeGenerator for StaticGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        Ok(self.0.to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl CodeGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Timeout(30))
    }
}

struct EchoReviewer;

#[async_trait]
impl ReviewService for EchoReviewer {
    async fn review(&self, prompt: &str) -> Result<String, CollaboratorError> {
        Ok(format!("looks reasonable: {}", prompt.len()))
    }
}

struct DownReviewer;

#[async_trait]
impl ReviewService for DownReviewer {
    async fn review(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable("503".to_string()))
    }
}

fn gate() -> CodeReviewer {
    CodeReviewer::new(ReviewConfig::default())
}

#[tokio::test]
async fn an_approved_instruction_runs_end_to_end() {
    let mut manager = memory_manager();
    let id = approved_instruction(&mut manager, "parse_date");

    let mut executor =
        WorkflowExecutor::new(manager, Arc::new(StaticGenerator(clean_artifact())), gate());
    let outcome = executor.execute(&id).await.unwrap();

    assert_eq!(outcome.function_name, "parse_date");
    assert_eq!(outcome.generated_code, clean_artifact());
    assert!(outcome.report.syntax_valid);
    assert_eq!(outcome.report.overall_score, 100);
    assert!(outcome.external_review.is_none());

    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Executed
    );
}

#[tokio::test]
async fn unapproved_instructions_are_refused() {
    let mut manager = memory_manager();
    let id = manager
        .create("draft_fn", codegate_test_utils::sample_requirements())
        .unwrap()
        .id()
        .to_string();

    let mut executor =
        WorkflowExecutor::new(manager, Arc::new(StaticGenerator(clean_artifact())), gate());
    let err = executor.execute(&id).await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::NotApproved {
            status: InstructionStatus::Draft,
            ..
        }
    ));
    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Draft
    );
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let mut executor = WorkflowExecutor::new(
        memory_manager(),
        Arc::new(StaticGenerator(clean_artifact())),
        gate(),
    );
    let err = executor.execute("no-such-id").await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn generator_failure_leaves_the_instruction_approved() {
    let mut manager = memory_manager();
    let id = approved_instruction(&mut manager, "parse_date");

    let mut executor = WorkflowExecutor::new(manager, Arc::new(FailingGenerator), gate());
    let err = executor.execute(&id).await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Generation(CollaboratorError::Timeout(30))
    ));
    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Approved
    );
}

#[tokio::test]
async fn empty_generation_is_rejected() {
    let mut manager = memory_manager();
    let id = approved_instruction(&mut manager, "parse_date");

    let mut executor = WorkflowExecutor::new(manager, Arc::new(StaticGenerator("  \n")), gate());
    let err = executor.execute(&id).await.unwrap_err();

    assert!(matches!(err, WorkflowError::EmptyGeneration));
    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Approved
    );
}

#[tokio::test]
async fn second_opinion_is_carried_verbatim() {
    let mut manager = memory_manager();
    let id = approved_instruction(&mut manager, "parse_date");

    let mut executor =
        WorkflowExecutor::new(manager, Arc::new(StaticGenerator(clean_artifact())), gate())
            .with_second_opinion(Arc::new(EchoReviewer));
    let outcome = executor.execute(&id).await.unwrap();

    let review = outcome.external_review.unwrap();
    assert!(review.starts_with("looks reasonable"));
}

#[tokio::test]
async fn second_opinion_failure_degrades_to_a_warning() {
    let mut manager = memory_manager();
    let id = approved_instruction(&mut manager, "parse_date");

    let mut executor =
        WorkflowExecutor::new(manager, Arc::new(StaticGenerator(clean_artifact())), gate())
            .with_second_opinion(Arc::new(DownReviewer));
    let outcome = executor.execute(&id).await.unwrap();

    assert!(outcome.external_review.is_none());
    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Executed
    );
}

#[tokio::test]
async fn the_executor_enforces_the_approval_precondition() {
    let (manager, _dir) = temp_manager();
    let mut executor = WorkflowExecutor::new(
        manager,
        Arc::new(StaticGenerator(clean_artifact())),
        gate(),
    );

    let id = executor
        .manager_mut()
        .create("guarded", codegate_test_utils::sample_requirements())
        .unwrap()
        .id()
        .to_string();

    // Draft -> Approved is not in the lifecycle table.
    let err = executor.approve(&id, "alice").unwrap_err();
    assert!(matches!(err, WorkflowError::Instruction(_)));

    executor.manager_mut().submit_for_review(&id).unwrap();
    assert!(executor.approve(&id, "alice").unwrap());
    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Approved
    );

    // Unknown ids are a branchable false, not an error.
    assert!(!executor.approve("missing", "alice").unwrap());
}

#[tokio::test]
async fn a_flawed_artifact_still_executes_with_a_low_score() {
    let mut manager = memory_manager();
    let id = approved_instruction(&mut manager, "load_user");

    let flawed = "\
def load_user(db, user_id):
    cursor = db.cursor()
    cursor.execute(\"SELECT * FROM users WHERE id = \" + user_id)
    return cursor.fetchone()
";
    let mut executor = WorkflowExecutor::new(manager, Arc::new(StaticGenerator(flawed)), gate());
    let outcome = executor.execute(&id).await.unwrap();

    // The gate informs the human; it does not block execution.
    assert!(outcome.report.overall_score < 60);
    assert!(!outcome.report.issues.critical.is_empty());
    assert_eq!(
        executor.manager().get(&id).unwrap().status(),
        InstructionStatus::Executed
    );
}
