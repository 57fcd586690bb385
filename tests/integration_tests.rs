use std::sync::Arc;

use async_trait::async_trait;
use credit_dossier::*;

const REFERENCE_YEAR: i32 = 2024;

/// Oracle with scripted answers for end-to-end scenarios.
struct ScriptedOracle {
    tier: ReportTier,
    equation: EquationFindings,
    opinions: DualOpinions,
    coverage: ProjectionCoverage,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self {
            tier: ReportTier::Indeterminate,
            equation: EquationFindings::default(),
            opinions: DualOpinions::default(),
            coverage: ProjectionCoverage::default(),
        }
    }
}

impl ScriptedOracle {
    fn balanced_books() -> Self {
        Self {
            equation: EquationFindings {
                assets: Some(150_000.0),
                liabilities: Some(50_000.0),
                equity: Some(100_000.0),
                claimed_difference: Some(0.0),
                claimed_balanced: Some(true),
            },
            ..Self::default()
        }
    }
}

#[async_trait]
impl ClassificationOracle for ScriptedOracle {
    async fn classify_report_tier(&self, _text: &str, _debt: &DebtContext) -> ReportTier {
        self.tier
    }

    async fn check_accounting_equation(&self, _text: &str) -> EquationFindings {
        self.equation.clone()
    }

    async fn check_dual_opinions(&self, _text: &str) -> DualOpinions {
        self.opinions
    }

    async fn check_projection_coverage(&self, _text: &str) -> ProjectionCoverage {
        self.coverage
    }
}

/// Fetcher that always fails, for retry exhaustion.
struct DeadFetcher;

#[async_trait]
impl ContentFetcher for DeadFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        Err(DossierError::StorageFailure(format!(
            "connection reset fetching {locator}"
        )))
    }
}

fn pipeline_with(oracle: ScriptedOracle) -> DossierPipeline {
    let _ = env_logger::builder().is_test(true).try_init();
    let blobs = Arc::new(InMemoryBlobStore::new());
    DossierPipeline::new(blobs.clone(), blobs, Arc::new(oracle))
        .with_integrity_policy(Arc::new(AlwaysPass))
        .with_reference_year(REFERENCE_YEAR)
}

fn balance_text(year: i32) -> String {
    format!(
        "balance sheet {year}: statement of financial position listing total assets, \
         total liabilities, equity and comprehensive income for the reporting period, \
         together with notes on receivables, payables and retained earnings."
    )
}

fn cashflow_text(final_year: i32) -> String {
    format!(
        "projected cashflow through {final_year}: operating activities, investing \
         activities, financing activities and the closing cash position for every \
         projected year of the plan."
    )
}

#[tokio::test]
async fn test_unsupported_extension_is_recorded_but_never_keyed() {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(b"MZ\x90\x00", "installer.exe")
        .await
        .unwrap();

    assert!(!outcome.accepted);
    assert!(outcome
        .document
        .validation_message
        .as_ref()
        .unwrap()
        .contains("Unsupported file format"));
    assert_eq!(
        outcome.document.document_type,
        DocumentType::Unrecognized
    );

    // Recorded for the caller, but a later valid balance is unaffected.
    assert_eq!(pipeline.list_documents().len(), 1);

    let balance = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023.txt")
        .await
        .unwrap();
    assert!(balance.accepted);
    assert_eq!(pipeline.list_documents().len(), 2);
}

#[tokio::test]
async fn test_valid_balance_survives_later_invalid_submission() {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        ..ContextUpdate::default()
    });

    let valid = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023.txt")
        .await
        .unwrap();
    assert!(valid.accepted);

    // Same identity key, structurally incomplete.
    let invalid = pipeline
        .upload_and_validate(b"balance sheet 2023", "balance-2023-v2.txt")
        .await
        .unwrap();
    assert!(!invalid.accepted);

    let listed = pipeline.list_documents();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, valid.document.id);
    assert!(listed[0].is_valid);
}

#[tokio::test]
async fn test_two_invalid_submissions_leave_only_the_latest() {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        ..ContextUpdate::default()
    });

    let first = pipeline
        .upload_and_validate(b"balance sheet 2023", "balance-2023-a.txt")
        .await
        .unwrap();
    let second = pipeline
        .upload_and_validate(b"balance sheet 2023", "balance-2023-b.txt")
        .await
        .unwrap();
    assert!(!first.accepted);
    assert!(!second.accepted);

    let listed = pipeline.list_documents();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.document.id);
    assert!(!listed[0].is_valid);
}

#[tokio::test]
async fn test_balance_equation_failure_quotes_recomputed_difference() {
    let oracle = ScriptedOracle {
        equation: EquationFindings {
            assets: Some(200.0),
            liabilities: Some(50.0),
            equity: Some(100.0),
            // The oracle contradicts its own numbers; the recomputation wins.
            claimed_difference: Some(0.0),
            claimed_balanced: Some(true),
        },
        ..ScriptedOracle::default()
    };
    let pipeline = pipeline_with(oracle);
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Regular),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023.txt")
        .await
        .unwrap();

    assert!(!outcome.accepted);
    assert!(outcome
        .document
        .validation_message
        .as_ref()
        .unwrap()
        .contains("difference 50.00"));
}

#[tokio::test]
async fn test_deta_missing_cashflow_opinion_cites_only_cashflow() {
    let oracle = ScriptedOracle {
        opinions: DualOpinions {
            cashflow_opinion: OpinionPresence::Absent,
            credit_opinion: OpinionPresence::Present,
        },
        ..ScriptedOracle::default()
    };
    let pipeline = pipeline_with(oracle);
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(
            b"declaracion deta for the holding: overall credit recommendation positive, \
              figures reviewed against the season's projections and market prices.",
            "deta-declaration.txt",
        )
        .await
        .unwrap();

    assert!(!outcome.accepted);
    let message = outcome.document.validation_message.unwrap();
    assert!(message.contains("missing an opinion on the projected cashflow"));
    assert!(!message.contains("Both opinions"));
}

#[tokio::test]
async fn test_cashflow_coverage_against_debt_term() {
    let short_oracle = ScriptedOracle {
        coverage: ProjectionCoverage {
            final_year: Some(2028),
            duration_years: None,
            confidence: Confidence::High,
        },
        ..ScriptedOracle::default()
    };
    let pipeline = pipeline_with(short_oracle);
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Regular),
        max_debt_term_years: Some(5),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(cashflow_text(2028).as_bytes(), "cashflow.txt")
        .await
        .unwrap();
    assert!(!outcome.accepted);
    let message = outcome.document.validation_message.unwrap();
    assert!(message.contains("2028"));
    assert!(message.contains("2029"));

    let sufficient_oracle = ScriptedOracle {
        coverage: ProjectionCoverage {
            final_year: Some(2029),
            duration_years: None,
            confidence: Confidence::High,
        },
        ..ScriptedOracle::default()
    };
    let pipeline = pipeline_with(sufficient_oracle);
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Regular),
        max_debt_term_years: Some(5),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(cashflow_text(2029).as_bytes(), "cashflow.txt")
        .await
        .unwrap();
    assert!(outcome.accepted);
    assert!(outcome
        .document
        .validation_message
        .as_ref()
        .unwrap()
        .contains("2029"));
    assert_eq!(outcome.document.document_year, Some(2029));
}

#[tokio::test]
async fn test_new_company_fourth_balance_hits_the_quota() {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::New),
        ..ContextUpdate::default()
    });

    for year in [2021, 2022, 2023] {
        let outcome = pipeline
            .upload_and_validate(
                balance_text(year).as_bytes(),
                &format!("balance-{year}.txt"),
            )
            .await
            .unwrap();
        assert!(outcome.accepted, "balance {year} should be accepted");
    }

    // Structurally and arithmetically sound, rejected by quota anyway.
    let fourth = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023-v2.txt")
        .await
        .unwrap();
    assert!(!fourth.accepted);
    assert!(fourth
        .document
        .validation_message
        .as_ref()
        .unwrap()
        .contains("up to 3"));

    let listed = pipeline.list_documents();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|doc| doc.is_valid));
}

#[tokio::test]
async fn test_dicose_year_must_match_existing_balance() {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        ..ContextUpdate::default()
    });

    let balance = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023.txt")
        .await
        .unwrap();
    assert!(balance.accepted);

    let dicose = pipeline
        .upload_and_validate(
            b"registro dicose 2022: livestock declaration for the agricultural holding",
            "dicose.txt",
        )
        .await
        .unwrap();
    assert!(!dicose.accepted);
    let message = dicose.document.validation_message.unwrap();
    assert!(message.contains("2022"));
    assert!(message.contains("2023"));

    let matching = pipeline
        .upload_and_validate(
            b"registro dicose 2023: livestock declaration for the agricultural holding",
            "dicose-v2.txt",
        )
        .await
        .unwrap();
    assert!(matching.accepted);
}

#[tokio::test]
async fn test_accountant_report_tier_ladder() {
    let oracle = ScriptedOracle {
        tier: ReportTier::LimitedReview,
        ..ScriptedOracle::default()
    };
    let pipeline = pipeline_with(oracle);
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Regular),
        max_debt_amount: Some(3_000_000.0),
        ..ContextUpdate::default()
    });

    let report = b"informe profesional: declaration certified by the undersigned public \
                   accountant after performing the agreed procedures for the engagement.";
    let outcome = pipeline
        .upload_and_validate(report, "informe.txt")
        .await
        .unwrap();
    assert!(!outcome.accepted);
    let message = outcome.document.validation_message.unwrap();
    assert!(message.contains("Audit"));
    assert!(message.contains("Limited Review"));

    // Lower the declared debt and the same report passes.
    pipeline.set_context(&ContextUpdate {
        max_debt_amount: Some(1_000_000.0),
        ..ContextUpdate::default()
    });
    let outcome = pipeline
        .upload_and_validate(report, "informe-v2.txt")
        .await
        .unwrap();
    assert!(outcome.accepted);
}

#[tokio::test]
async fn test_binary_integrity_gate_rejects_corrupted_pdf() {
    let blobs = Arc::new(InMemoryBlobStore::new());
    let pipeline = DossierPipeline::new(
        blobs.clone(),
        blobs,
        Arc::new(ScriptedOracle::balanced_books()),
    )
    .with_integrity_policy(Arc::new(RandomRejection::seeded(7, 1.0)))
    .with_reference_year(REFERENCE_YEAR);
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Regular),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(
            b"%PDF-1.4",
            "balance sheet assets liabilities income equity 2023.pdf",
        )
        .await
        .unwrap();

    assert!(!outcome.accepted);
    assert!(outcome
        .document
        .validation_message
        .as_ref()
        .unwrap()
        .contains("corrupted"));
}

#[tokio::test]
async fn test_binary_dicose_accepted_via_filename() {
    let pipeline = pipeline_with(ScriptedOracle::default());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(b"%PDF-1.4", "DICOSE-registro-2023.pdf")
        .await
        .unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.document.document_type, DocumentType::Dicose);
    assert_eq!(outcome.document.document_year, Some(2023));
}

#[tokio::test]
async fn test_unrecognized_type_lists_expected_documents() {
    let pipeline = pipeline_with(ScriptedOracle::default());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::New),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(
            b"meeting notes from tuesday about the harvest calendar",
            "notes.txt",
        )
        .await
        .unwrap();

    assert!(!outcome.accepted);
    let message = outcome.document.validation_message.unwrap();
    assert!(message.contains("Document type not recognized"));
    assert!(message.contains("up to 3"));
}

#[tokio::test]
async fn test_delete_document_removes_record_and_bytes() -> anyhow::Result<()> {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Regular),
        ..ContextUpdate::default()
    });

    let outcome = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023.txt")
        .await?;
    let id = outcome.document.id;

    pipeline.delete_document(id).await?;
    assert!(pipeline.list_documents().is_empty());

    assert!(matches!(
        pipeline.delete_document(id).await,
        Err(DossierError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_fetch_retry_budget_is_surfaced() {
    let blobs = Arc::new(InMemoryBlobStore::new());
    let pipeline = DossierPipeline::new(
        blobs,
        Arc::new(DeadFetcher),
        Arc::new(ScriptedOracle::default()),
    )
    .with_reference_year(REFERENCE_YEAR);

    let result = pipeline.validate("mem://gone/balance.txt", "balance.txt").await;
    match result {
        Err(DossierError::TransientFetchFailure { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected fetch exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_category_change_keeps_documents_and_debt_fields() {
    let pipeline = pipeline_with(ScriptedOracle::balanced_books());
    pipeline.set_context(&ContextUpdate {
        company_category: Some(CompanyCategory::Agricultural),
        max_debt_amount: Some(500_000.0),
        max_debt_term_years: Some(4),
    });

    let outcome = pipeline
        .upload_and_validate(balance_text(2023).as_bytes(), "balance-2023.txt")
        .await
        .unwrap();
    assert!(outcome.accepted);

    pipeline.set_company_category(Some(CompanyCategory::New));

    let context = pipeline.get_context();
    assert_eq!(context.company_category, Some(CompanyCategory::New));
    assert_eq!(context.max_debt_amount, Some(500_000.0));
    assert_eq!(context.max_debt_term_years, Some(4));
    assert_eq!(pipeline.list_documents().len(), 1);
}
