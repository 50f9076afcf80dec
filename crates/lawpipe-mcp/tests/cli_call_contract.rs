use assert_cmd::cargo::cargo_bin_cmd;

// These never reach the gateway: the base points at a closed port so an
// accidental request would surface as `request_failed`.
fn lawpipe() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lawpipe");
    cmd.env("LAWPIPE_API_BASE", "http://127.0.0.1:9")
        .env_remove("LAWPIPE_ENV_FILE")
        .env("LAWPIPE_LOG", "off");
    cmd
}

fn stdout_json(cmd: &mut assert_cmd::Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("stdout is json")
}

#[test]
fn guidance_prints_the_playbook() {
    lawpipe()
        .args(["guidance"])
        .assert()
        .success()
        .stdout(predicates::str::starts_with("# 法令検索AI向けガイダンス"))
        .stdout(predicates::str::contains("### 7. 表記揺れへの対処"));
}

#[test]
fn call_lookup_age_category() {
    let v = stdout_json(lawpipe().args([
        "call",
        "--tool",
        "lookup_age_category",
        "--args-json",
        r#"{"age": 6}"#,
    ]));
    let names: Vec<&str> = v["categories"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["category"].as_str())
        .collect();
    assert_eq!(names, vec!["児童", "未成年者", "年少者"]);
    assert_eq!(
        v["summary"],
        "未成年者として、労働基準法による保護や民法上の制限があります。"
    );
}

#[test]
fn call_translate_legal_terms() {
    let v = stdout_json(lawpipe().args([
        "call",
        "--tool",
        "translate_legal_terms",
        "--args-json",
        r#"{"terms": ["チャイルドシート", "量子"]}"#,
    ]));
    assert_eq!(v["expansions"][0]["legal_terms"][0], "幼児用補助装置");
    assert_eq!(v["expansions"][1]["matched"], "none");
}

#[test]
fn call_analyze_search_results() {
    let args = serde_json::json!({
        "original_query": "6歳の子供にチャイルドシートは必要か",
        "search_results": [
            {"law_id": "335AC0000000105", "law_title": "道路交通法", "position": "1",
             "text": "幼児用補助装置を使用しない幼児を乗車させてはならない。ただし政令で定める"},
            {"law_id": "335AC0000000105", "law_title": "道路交通法", "position": "2",
             "text": "児童福祉法第四条に規定する"}
        ]
    })
    .to_string();
    let v = stdout_json(lawpipe().args([
        "call",
        "--tool",
        "analyze_search_results",
        "--args-json",
        args.as_str(),
    ]));
    let actions: Vec<&str> = v["suggested_actions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["action"].as_str())
        .collect();
    assert_eq!(
        actions,
        vec![
            "get_full_law",
            "search_definition",
            "search_referenced_law",
            "search_age_definitions"
        ]
    );
    assert_eq!(v["referenced_laws"][0]["to_law"], "児童福祉法");
}

#[test]
fn unknown_tool_is_invalid_params() {
    let v = stdout_json(lawpipe().args(["call", "--tool", "web_search"]));
    assert_eq!(v["error"], "invalid_params");
}

#[test]
fn malformed_args_json_fails_the_command() {
    lawpipe()
        .args(["call", "--tool", "lookup_age_category", "--args-json", "{"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--args-json"));
}
