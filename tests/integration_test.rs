use exercise_forge::config::Config;
use exercise_forge::logger;
use exercise_forge::models::{
    GeneratedExercise, GenerationRequest, SubmissionResult, SubmissionToken,
};
use exercise_forge::services::{
    DraftField, JudgeRunner, NoticeLevel, PollPolicy, TestCaseField,
};
use exercise_forge::testing::{
    FakeExerciseApi, FakeJudgeApi, RecordingNotifier, RecordingSleeper,
};
use exercise_forge::workflow::{
    CommitAllError, GenerateOutcome, GenerationFlow, RunState, Step,
};
use exercise_forge::{error::ApiError, App};
use serde_json::json;

type TestFlow = GenerationFlow<FakeExerciseApi, FakeJudgeApi, RecordingSleeper>;

fn request() -> GenerationRequest {
    toml::from_str(
        r#"
topic = "字符串处理"
levels = ["EASY", "MEDIUM"]
numberOfExercise = 3
numberOfPublicTestCases = 1
numberOfPrivateTestCases = 1
solutionLanguage = "Python"
"#,
    )
    .expect("解析生成参数失败")
}

fn exercise(code: &str) -> GeneratedExercise {
    serde_json::from_value(json!({
        "code": code,
        "title": format!("反转字符串 {}", code),
        "description": "输出反转后的字符串",
        "difficulty": "EASY",
        "solution": "print(input()[::-1])",
        "solutionLanguage": "Python",
        "testCases": [
            {"id": 1, "input": "abc", "output": "cba", "isPublic": true},
            {"id": 2, "input": "xy", "output": "yx", "isPublic": false}
        ]
    }))
    .expect("构造生成结果失败")
}

fn new_flow() -> (TestFlow, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let judge = JudgeRunner::with_sleeper(
        FakeJudgeApi::default(),
        RecordingSleeper::default(),
        PollPolicy::default(),
        128_000,
    );
    let flow = GenerationFlow::new(
        FakeExerciseApi::default(),
        judge,
        Box::new(notifier.clone()),
    );
    (flow, notifier)
}

fn accepted(stdout: &str) -> Option<SubmissionResult> {
    Some(SubmissionResult {
        status_id: Some(3),
        stdout: Some(stdout.to_string()),
        ..Default::default()
    })
}

fn tokens(n: usize) -> Vec<SubmissionToken> {
    (0..n)
        .map(|i| SubmissionToken {
            token: Some(format!("tok-{}", i)),
        })
        .collect()
}

#[tokio::test]
async fn test_generate_edit_run_commit() {
    let (mut flow, notifier) = new_flow();
    flow.exercise_api().push_generate(Ok(vec![
        exercise("REV-1"),
        exercise("REV-2"),
        exercise("REV-3"),
    ]));

    let outcome = flow.generate(&request()).await.unwrap();
    assert_eq!(outcome, GenerateOutcome::Generated(3));
    assert_eq!(flow.ctx().step(), Step::Previewing);

    // 编辑第二道题：改标题、补一个测试用例
    flow.ctx_mut().begin_edit(1);
    flow.ctx_mut()
        .update_field(1, DraftField::Title("反转单词".to_string()));
    let case = flow.ctx_mut().add_test_case(1);
    flow.ctx_mut()
        .update_test_case(1, case, TestCaseField::Input("hello".to_string()));
    flow.ctx_mut()
        .update_test_case(1, case, TestCaseField::Output("olleh".to_string()));
    flow.ctx_mut().end_edit(1);
    assert_eq!(flow.ctx().draft(1).test_cases.len(), 3);

    // 运行第二道题：第一次轮询仍在排队，第二次全部完成
    flow.select_active(1);
    flow.judge().api().push_submit(Ok(tokens(3)));
    flow.judge().api().push_status(Ok(vec![accepted("cba"), None, None]));
    flow.judge()
        .api()
        .push_status(Ok(vec![accepted("cba\n"), accepted("yx"), accepted("hello")]));

    let report = flow.run_active().await.unwrap();
    assert_eq!(report.passed(), 2);
    assert_eq!(report.total(), 3);
    assert!(!report.results[2].is_passed());
    assert_eq!(flow.judge().api().status_calls(), 2);
    assert!(matches!(flow.ctx().run_state(), RunState::Finished(_)));
    assert_eq!(notifier.last().unwrap().level, NoticeLevel::Warning);

    // 删除第三道后撤销
    let handle = flow.delete_draft(2);
    assert_eq!(flow.ctx().drafts().len(), 2);
    assert!(flow.undo_delete(handle));
    assert_eq!(flow.ctx().drafts().len(), 3);

    let committed = flow.commit_all().await.unwrap();
    assert_eq!(committed, 3);
    assert_eq!(flow.ctx().step(), Step::Configuring);

    let created = flow.exercise_api().created();
    let codes: Vec<_> = created.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["REV-1", "REV-2", "REV-3"]);
    assert_eq!(created[1].title, "反转单词");
    assert_eq!(created[1].test_cases.len(), 3);
}

#[tokio::test]
async fn test_commit_all_partial_failure_keeps_rest() {
    let (mut flow, notifier) = new_flow();
    flow.exercise_api()
        .push_generate(Ok(vec![exercise("A"), exercise("B"), exercise("C")]));
    flow.generate(&request()).await.unwrap();

    flow.exercise_api().push_create(Ok(Some("101".to_string())));
    flow.exercise_api().push_create(Err(ApiError::BadResponse {
        endpoint: "exercises".to_string(),
        status: 409,
        message: Some("题目编号已存在".to_string()),
    }));

    let err = flow.commit_all().await.unwrap_err();
    assert_eq!(err.committed(), 1);
    assert!(matches!(err, CommitAllError::Partial { ref code, .. } if code == "B"));
    assert_eq!(flow.exercise_api().create_attempts(), 2);
    assert_eq!(flow.ctx().drafts().len(), 2);
    assert_eq!(flow.ctx().step(), Step::Previewing);
    assert!(notifier.last().unwrap().message.contains("题目编号已存在"));

    // 再次提交剩余的草稿
    let committed = flow.commit_all().await.unwrap();
    assert_eq!(committed, 2);
    assert_eq!(flow.ctx().step(), Step::Configuring);
}

#[tokio::test]
async fn test_stale_run_result_does_not_overwrite_selection() {
    let (mut flow, notifier) = new_flow();
    flow.exercise_api()
        .push_generate(Ok(vec![exercise("A"), exercise("B")]));
    flow.generate(&request()).await.unwrap();

    let (ticket, draft) = flow.begin_run().unwrap();
    assert_eq!(draft.code, "A");

    // 运行中再次开始被拒绝
    assert!(flow.begin_run().is_err());
    assert_eq!(notifier.last().unwrap().level, NoticeLevel::Warning);

    // 结果返回前切换到 B
    flow.select_active(1);
    flow.judge().api().push_submit(Ok(tokens(2)));
    flow.judge()
        .api()
        .push_status(Ok(vec![accepted("cba"), accepted("yx")]));
    let outcome = flow.judge().run(&draft).await;
    let notices_before = notifier.notices().len();

    let report = flow.finish_run(ticket, outcome).unwrap();
    assert!(report.all_passed());
    assert_eq!(flow.ctx().run_state(), &RunState::Idle);
    assert_eq!(notifier.notices().len(), notices_before);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_generation() {
    // 初始化日志
    logger::init();

    // 加载配置（需要 CONFIG_PATH 或环境变量指向真实服务）
    let config = Config::load().expect("加载配置失败");

    let summary = App::initialize(config)
        .await
        .expect("初始化失败")
        .run()
        .await
        .expect("运行失败");

    assert!(summary.generated > 0, "应该至少生成一道题目");
}
