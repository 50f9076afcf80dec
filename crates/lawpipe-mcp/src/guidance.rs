//! Static search playbook returned by `get_search_guidance`.

pub const SEARCH_GUIDANCE: &str = r#"# 法令検索AI向けガイダンス

## 効果的な法令検索の段階的アプローチ

### 1. 初期検索戦略
自然言語の質問から法的な概念を取り出し、次の順に検索してください：
1. 主要な名詞でキーワード検索する（例：「シートベルト」「着用」）
2. 一般用語を法令用語に置き換えて再検索する（例：「シートベルト」→「座席ベルト」）。translate_legal_terms が候補を返します
3. 関連する法令名で検索する（例：交通に関する質問→「道路交通法」）

### 2. 検索結果の評価
- 複数の法令がヒットした場合は、分類と本文から最も関連の深い法令を選ぶ
- 条文で定義されていない用語（例：「幼児」）が出てきたら、その定義を別途検索する
- 0件の場合はキーワードを減らすか、類義語で検索し直す
- analyze_search_results で結果の偏りや参照先の法令を確認できます

### 3. 深掘り検索
- 対象の法令が決まったら get_law_content で条文を取得する
- 他の法令への参照（例：「児童福祉法に定める」）があれば、その法令も検索する
- 年齢や数値の規定は前後の条文もあわせて確認する

### 4. 回答生成時の注意
- 法令間の参照関係は明示する（例：「道路交通法は『幼児』を定義していないが、児童福祉法の定義（小学校就学の始期に達するまでの者）が参考になる」）
- 検索で確認できなかった点は推論であると明記する
- 解釈が複数ありうる場合はその旨を書く

### 5. 具体例：年齢に関する規定の検索
質問：「X歳でYはできるか？」
1. Yに関する法令をキーワード検索する
2. 年齢制限や年齢区分（幼児、児童、未成年など）を含む条文を特定する
3. その年齢区分の定義を他の法令で検索する
4. X歳がどの区分に入るかを判断する（lookup_age_category が目安を返します）

### 6. よく使われる年齢区分の検索ヒント
- 「幼児」→「児童福祉法」で定義を検索
- 「児童」→「児童福祉法」「学校教育法」で定義を検索
- 「未成年」→「民法」で定義を検索
- 「少年」→「少年法」で定義を検索

### 7. 表記揺れへの対処
同じ概念でも法令によって表記が異なることがあります：
- 「シートベルト」「座席ベルト」
- 「自動車」「車両」「車」
- 「道路」「道」
複数の表記で検索してください。

このガイダンスに沿って、段階的かつ体系的に検索を進めてください。
"#;
