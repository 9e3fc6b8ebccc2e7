//! The gRPC serving edge: translates between the generated `home_mixer.proto`
//! wire types and [`CandidatePipeline`]'s native `Query`/`Candidate` types.

use std::sync::Arc;

use candidate_pipeline::types::{BloomFilterEntry, Candidate, Query};
use candidate_pipeline::CandidatePipeline;
use tonic::{Request, Response, Status};

use crate::config::{Metrics, RequestContext};
use crate::proto::scored_posts_service_server::ScoredPostsService as ScoredPostsServiceTrait;
use crate::proto::{ScoredPost, ScoredPostsQuery, ScoredPostsResponse};
use crate::util::request_util::generate_request_id;

pub struct HomeMixerServer {
    pipeline: CandidatePipeline,
    metrics: Arc<Metrics>,
}

impl HomeMixerServer {
    pub fn new(pipeline: CandidatePipeline) -> Self {
        Self {
            pipeline,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }
}

#[tonic::async_trait]
impl ScoredPostsServiceTrait for HomeMixerServer {
    async fn get_scored_posts(
        &self,
        request: Request<ScoredPostsQuery>,
    ) -> Result<Response<ScoredPostsResponse>, Status> {
        let req = request.into_inner();
        if req.viewer_id == 0 {
            return Err(Status::invalid_argument("viewer_id must be non-zero"));
        }

        let ctx = RequestContext::new(req.viewer_id, self.metrics.clone());
        let query = to_query(req);
        let result = self.pipeline.execute(&query).await;

        let mut screen_names = std::collections::HashMap::new();
        let scored_posts = result
            .selected_candidates
            .iter()
            .map(|candidate| {
                screen_names.extend(candidate.screen_names());
                to_wire(candidate)
            })
            .collect();

        log::debug!(
            "request_id={} user_id={} served {} posts in {}ms",
            ctx.request_id,
            ctx.user_id,
            scored_posts.len(),
            ctx.elapsed_ms()
        );
        ctx.finish(true);

        Ok(Response::new(ScoredPostsResponse { scored_posts }))
    }
}

fn to_query(req: ScoredPostsQuery) -> Query {
    Query {
        user_id: req.viewer_id as i64,
        client_app_id: req.client_app_id,
        country_code: req.country_code,
        language_code: req.language_code,
        seen_ids: req.seen_ids,
        served_ids: req.served_ids,
        in_network_only: req.in_network_only,
        is_bottom_request: req.is_bottom_request,
        bloom_filter_entries: req
            .bloom_filter_entries
            .into_iter()
            .map(|entry| BloomFilterEntry { data: entry.filter_data })
            .collect(),
        request_id: generate_request_id(req.viewer_id),
        user_action_sequence: None,
        user_features: Default::default(),
    }
}

fn to_wire(candidate: &Candidate) -> ScoredPost {
    ScoredPost {
        tweet_id: candidate.tweet_id as u64,
        author_id: candidate.author_id,
        retweeted_tweet_id: candidate.retweeted_tweet_id,
        retweeted_user_id: candidate.retweeted_user_id,
        in_reply_to_tweet_id: candidate.in_reply_to_tweet_id,
        score: candidate.score.unwrap_or(0.0),
        in_network: candidate.in_network.unwrap_or(false),
        served_type: candidate.served_type.unwrap_or(0),
        last_scored_timestamp_ms: candidate.last_scored_at_ms.unwrap_or(0),
        prediction_request_id: candidate.prediction_request_id.unwrap_or(0),
        ancestors: candidate.ancestors.clone(),
        screen_names: candidate.screen_names(),
        visibility_reason: candidate.visibility_reason.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_a_zero_viewer_id() {
        let server = HomeMixerServer::new(crate::pipeline::build_mock(10));
        let request = Request::new(ScoredPostsQuery {
            viewer_id: 0,
            ..Default::default()
        });
        let err = server.get_scored_posts(request).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn serves_an_empty_response_with_no_candidates() {
        let server = HomeMixerServer::new(crate::pipeline::build_mock(10));
        let request = Request::new(ScoredPostsQuery {
            viewer_id: 1,
            ..Default::default()
        });
        let response = server.get_scored_posts(request).await.unwrap();
        assert!(response.into_inner().scored_posts.is_empty());
    }
}
