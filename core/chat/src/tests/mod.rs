//! シナリオテスト（複数レイヤーをまたぐもの）
