//! # End-to-End Flows
//!
//! Author, reviewer and review server cooperating over one ledger:
//!
//! 1. author publishes an encrypted preprint linked to the server
//! 2. reviewer signs a review of it
//! 3. server verifies, seals and publishes the review round
//! 4. author opens the round, accepts and publishes `v1`

#[cfg(test)]
mod tests {
    use papr_01_signature_verification::ReviewSignatureApi;
    use papr_02_article_revisions::{ArticleError, ArticleRevisionApi};
    use papr_03_review_rounds::{read_author_key, ReviewRound, ReviewRoundApi, ReviewRoundError};
    use shared_types::{ArticleState, Review};

    use crate::integration::world::{World, AUTHOR, REVIEWER, SERVER_CHANNEL};

    async fn signed_review(world: &World, submission: &str, text: &str) -> String {
        let mut review = Review::draft(submission, AUTHOR, REVIEWER, text);
        world.reviewer.sign_review(&mut review).await.unwrap()
    }

    fn round_for(world: &World, submission: &str, artifacts: &[String]) -> ReviewRound {
        let mut round = ReviewRound::new(submission, 1, AUTHOR);
        for artifact in artifacts {
            round.add_review(REVIEWER, artifact.clone());
        }
        let key_file = world.submission_dir().join(format!("{submission}_key.pub"));
        round.set_author_key(read_author_key(submission, &key_file).unwrap());
        round
    }

    #[tokio::test]
    async fn test_full_review_cycle() {
        let world = World::new().await;
        let passphrase = world.create("paper", true, Some("review")).await;
        assert!(passphrase.is_some());

        let preprint = world
            .author
            .publish(world.revision("paper", 0, world.manuscript("draft.pdf", b"%PDF draft"), true))
            .await
            .unwrap();
        assert!(preprint.warnings.is_empty());
        assert!(preprint.manuscript.encrypted);
        assert_eq!(world.server.received("/api/submit/").len(), 1);

        let artifact = signed_review(&world, "paper_preprint", "The method is sound.").await;
        let server = world.author.server("review").await.unwrap();
        let published = world
            .rounds
            .publish(&round_for(&world, "paper_preprint", &[artifact]), &server)
            .await
            .unwrap();

        assert_eq!(published.claim_name, "paper_preprint_review1");
        let claim = world.ledger.claim("paper_preprint_review1").unwrap();
        assert_eq!(claim.request.channel_name.as_deref(), Some(SERVER_CHANNEL));

        let sealed = std::fs::read(&published.file_path).unwrap();
        let text = world.author.open_review_bundle("paper", &sealed).await.unwrap();
        assert!(text.contains("*** REVIEWER 1 ***"));
        assert!(text.contains("The method is sound."));

        let accepted = world.author.accept("paper").await.unwrap();
        assert_eq!(accepted.encryption_passphrase, passphrase);
        assert!(accepted.article.reviewed);
        assert_eq!(world.server.received("/api/accept").len(), 1);

        let official = world
            .author
            .publish(world.revision("paper", 1, world.manuscript("final.pdf", b"%PDF final"), false))
            .await
            .unwrap();
        assert_eq!(official.manuscript.claim_name, "paper_v1");
        assert!(!official.manuscript.encrypted);

        let article = world.author.article("paper").await.unwrap();
        assert_eq!(article.state(true), ArticleState::Official(1));
        assert!(article.encryption_passphrase.is_none());
    }

    #[tokio::test]
    async fn test_tampered_review_blocks_round() {
        let world = World::new().await;
        world.create("paper", false, Some("review")).await;
        world
            .author
            .publish(world.revision("paper", 0, world.manuscript("draft.pdf", b"%PDF"), false))
            .await
            .unwrap();

        let artifact = signed_review(&world, "paper_preprint", "Accept as is.").await;
        let tampered = artifact.replacen("Accept as is.", "Reject outright.", 1);
        let server = world.author.server("review").await.unwrap();

        let err = world
            .rounds
            .publish(&round_for(&world, "paper_preprint", &[tampered]), &server)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewRoundError::InvalidSignature { .. }));
        assert!(world.ledger.claim("paper_preprint_review1").is_none());
    }

    #[tokio::test]
    async fn test_review_of_other_submission_is_rejected() {
        let world = World::new().await;
        world.create("paper", false, None).await;
        world
            .author
            .publish(world.revision("paper", 0, world.manuscript("draft.pdf", b"%PDF"), false))
            .await
            .unwrap();

        let elsewhere = signed_review(&world, "other_preprint", "Fine.").await;
        let server = world.author.server("review").await.unwrap();

        let err = world
            .rounds
            .publish(&round_for(&world, "paper_preprint", &[elsewhere]), &server)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewRoundError::WrongSubmission { .. }));
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let mut world = World::new().await;
        world.create("paper", false, None).await;
        world
            .author
            .publish(world.revision("paper", 0, world.manuscript("draft.pdf", b"%PDF"), false))
            .await
            .unwrap();

        world.restart_author();

        let article = world.author.article("paper").await.unwrap();
        assert_eq!(article.revision, 0);
        assert_eq!(world.author.manuscripts("paper").await.unwrap().len(), 1);
        assert_eq!(world.author.server("review").await.unwrap().channel_name, SERVER_CHANNEL);

        let err = world
            .author
            .publish(world.revision("paper", 0, world.manuscript("again.pdf", b"%PDF"), false))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleError::AlreadySubmitted { .. }));

        let r1 = world
            .author
            .publish(world.revision("paper", 1, world.manuscript("r1.pdf", b"%PDF r1"), false))
            .await
            .unwrap();
        assert_eq!(r1.manuscript.claim_name, "paper_r1");
    }
}
