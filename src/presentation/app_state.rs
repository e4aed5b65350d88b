// Application state for HTTP handlers
use crate::application::air_quality_service::AirQualityService;
use crate::application::chat_service::ChatService;

#[derive(Clone)]
pub struct AppState {
    pub air_quality_service: AirQualityService,
    pub chat_service: ChatService,
}
