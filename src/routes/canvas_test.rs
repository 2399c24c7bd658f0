use super::*;
use crate::state::test_helpers::{attach_client, brush, recv_frame, snapshot_ids, test_app_state};

#[tokio::test]
async fn get_canvas_reports_timeline_redo_depth_and_connections() {
    let state = test_app_state();
    let _client = attach_client(&state).await;
    {
        let mut canvas = state.canvas.write().await;
        canvas.history.append(brush("a")).unwrap();
        canvas.history.append(brush("b")).unwrap();
        canvas.history.undo();
    }

    let Json(body) = get_canvas(State(state)).await;

    let ids: Vec<&str> = body.strokes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["a"]);
    assert_eq!(body.redo_depth, 1);
    assert_eq!(body.connections, 1);
    assert!(body.cursors.is_empty());
}

#[tokio::test]
async fn get_canvas_lists_only_reported_cursors() {
    let state = test_app_state();
    let (moved, _moved_rx) = attach_client(&state).await;
    let _idle = attach_client(&state).await;
    state.canvas.write().await.sessions.update_position(moved, 40.0, 50.0);

    let Json(body) = get_canvas(State(state)).await;

    assert_eq!(body.connections, 2);
    assert_eq!(body.cursors.len(), 1);
    let cursor = &body.cursors[0];
    assert_eq!(cursor.connection_id, moved);
    assert_eq!(cursor.user_id, moved);
    assert!((cursor.x - 40.0).abs() < f64::EPSILON);
    assert!((cursor.y - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn get_canvas_does_not_mutate() {
    let state = test_app_state();
    {
        let mut canvas = state.canvas.write().await;
        canvas.history.append(brush("a")).unwrap();
        canvas.history.undo();
    }

    let _ = get_canvas(State(state.clone())).await;

    let canvas = state.canvas.read().await;
    assert_eq!(canvas.history.len(), 0);
    assert_eq!(canvas.history.redo_depth(), 1);
}

#[tokio::test]
async fn dev_reset_returns_no_content_and_pushes_empty_snapshot() {
    let state = test_app_state();
    let (_id, mut rx) = attach_client(&state).await;
    {
        let mut canvas = state.canvas.write().await;
        canvas.history.append(brush("a")).unwrap();
    }

    assert_eq!(dev_reset(State(state.clone())).await, StatusCode::NO_CONTENT);

    assert!(snapshot_ids(&recv_frame(&mut rx).await).is_empty());
    assert_eq!(state.canvas.read().await.history.len(), 0);
}
