/// Google Gemini `generateContent` client
pub mod google;
